//! Concrete wallets as capability records.

use tronwallet_adapter_core::{
    AdapterIdentity, AddressSource, Announcement, AuthorizationProbe, Call, DeepLink, EventSurface, Injection,
    NetworkQuery, WalletDescriptor, WalletMethods,
};

const TRONLINK_ADDRESS: &str = "tronWeb.defaultAddress.base58";
const TRONLINK_CONNECT_ADDRESS: AddressSource = AddressSource::Property(TRONLINK_ADDRESS);

/// TronLink surface with `eth_requestAccounts` as the connect call.
const EVM_STYLE_CONNECT: WalletMethods = WalletMethods {
    connect: Call::Request("eth_requestAccounts"),
    address: AddressSource::FirstAccount,
    ..WalletMethods::TRONLINK
};

pub const TRUST: WalletDescriptor = WalletDescriptor {
    identity: AdapterIdentity {
        name: "Trust",
        url: "https://trustwallet.com",
        icon: include_str!("../assets/icons/trust.txt"),
    },
    injections: &[Injection::at("trustwallet.tronLink")],
    announcement: None,
    methods: WalletMethods::TRONLINK,
    events: EventSurface::WindowMessage,
    deep_link: Some(DeepLink {
        template: "https://link.trustwallet.com?source={url}",
        app_marker: Some("Trust"),
    }),
};

pub const GATE_WALLET: WalletDescriptor = WalletDescriptor {
    identity: AdapterIdentity {
        name: "Gate Wallet",
        url: "https://gate.io",
        icon: include_str!("../assets/icons/gate.txt"),
    },
    injections: &[
        Injection::at("gatewallet.tronLink")
            .connecting_with(Call::Request("tron_requestAccounts"), TRONLINK_CONNECT_ADDRESS),
        Injection::at("gatewallet.tron"),
    ],
    announcement: None,
    methods: EVM_STYLE_CONNECT,
    events: EventSurface::ProviderOn,
    deep_link: Some(DeepLink {
        template: "https://gateio.onelink.me/DmA6/web3?dapp_url={url}",
        app_marker: Some("GateApp"),
    }),
};

pub const AB_WALLET: WalletDescriptor = WalletDescriptor {
    identity: AdapterIdentity {
        name: "AB Wallet",
        url: "https://ab.org",
        icon: include_str!("../assets/icons/abwallet.txt"),
    },
    injections: &[Injection::at("abwallet.tronLink")],
    announcement: None,
    methods: WalletMethods::TRONLINK,
    events: EventSurface::WindowMessage,
    deep_link: Some(DeepLink {
        template: "abwallet://wallet/dapp/url?dappUrl={url}",
        app_marker: Some("ABWallet"),
    }),
};

pub const NABOX_WALLET: WalletDescriptor = WalletDescriptor {
    identity: AdapterIdentity {
        name: "Nabox Wallet",
        url: "https://nabox.io/",
        icon: include_str!("../assets/icons/nabox.txt"),
    },
    injections: &[Injection::at("NaboxWallet.tronLink")],
    announcement: None,
    methods: WalletMethods::TRONLINK,
    events: EventSurface::WindowMessage,
    deep_link: Some(DeepLink {
        template: "nabox://com.wallet.nabox?type=1&url={url}",
        app_marker: None,
    }),
};

pub const ONEKEY: WalletDescriptor = WalletDescriptor {
    identity: AdapterIdentity {
        name: "OneKey",
        url: "https://onekey.so/download",
        icon: include_str!("../assets/icons/onekey.txt"),
    },
    injections: &[Injection::at("$onekey.tron")],
    announcement: None,
    methods: WalletMethods::TRONLINK,
    events: EventSurface::WindowMessage,
    deep_link: None,
};

pub const SAFEPAL_WALLET: WalletDescriptor = WalletDescriptor {
    identity: AdapterIdentity {
        name: "SafePal Wallet",
        url: "https://safepal.com",
        icon: include_str!("../assets/icons/safepal.txt"),
    },
    injections: &[Injection::at("safepalwallet.tron")],
    announcement: None,
    methods: WalletMethods::TRONLINK,
    events: EventSurface::None,
    deep_link: Some(DeepLink {
        template: "https://link.safepal.io/wallet/openurl?url={url}",
        app_marker: None,
    }),
};

pub const TOMO_WALLET: WalletDescriptor = WalletDescriptor {
    identity: AdapterIdentity {
        name: "Tomo Wallet",
        url: "https://tomo.inc/",
        icon: include_str!("../assets/icons/tomo.txt"),
    },
    injections: &[Injection::at("tomo_wallet.tron")],
    announcement: None,
    methods: WalletMethods {
        switch_chain: Some(Call::RequestList("wallet_switchEthereumChain")),
        ..EVM_STYLE_CONNECT
    },
    events: EventSurface::ProviderOn,
    deep_link: None,
};

pub const GUARDA: WalletDescriptor = WalletDescriptor {
    identity: AdapterIdentity {
        name: "Guarda",
        url: "https://guarda.com?install=guarda-extensional",
        icon: include_str!("../assets/icons/guarda.txt"),
    },
    injections: &[Injection::at("guarda")],
    announcement: None,
    methods: WalletMethods {
        connect: Call::RequestAt {
            target: "tron",
            method: "eth_requestAccounts",
        },
        address: AddressSource::FirstAccount,
        authorized: AuthorizationProbe::ReadyFlag {
            ready: "ready",
            address: TRONLINK_ADDRESS,
        },
        sign_message: Some(Call::Method("tronWeb.trx.signMessage")),
        sign_transaction: Some(Call::Method("tronWeb.trx.sign")),
        multi_sign: None,
        switch_chain: None,
        network: Some(NetworkQuery::GenesisBlock),
        disconnect: None,
    },
    events: EventSurface::None,
    deep_link: None,
};

pub const BACKPACK: WalletDescriptor = WalletDescriptor {
    identity: AdapterIdentity {
        name: "Backpack",
        url: "https://backpack.app",
        icon: include_str!("../assets/icons/backpack.txt"),
    },
    injections: &[
        Injection::at("backpack.tron"),
        Injection::marked("tron", "isBackpack"),
    ],
    announcement: Some(Announcement {
        name: "Backpack",
        rdns: "app.backpack",
    }),
    methods: WalletMethods {
        connect: Call::Request("tron_requestAccounts"),
        address: AddressSource::FirstAccount,
        authorized: AuthorizationProbe::Request("tron_accounts"),
        sign_message: Some(Call::Request("tron_signMessage")),
        sign_transaction: Some(Call::Request("tron_signTransaction")),
        multi_sign: None,
        switch_chain: Some(Call::MethodOrRequest {
            path: "switchChain",
            method: "tron_switchChain",
        }),
        network: Some(NetworkQuery::ChainId(Call::Request("tron_chainId"))),
        disconnect: Some(Call::Method("disconnect")),
    },
    events: EventSurface::ProviderOn,
    deep_link: Some(DeepLink {
        template: "https://backpack.app/ul/browse/{url}",
        app_marker: Some("Backpack"),
    }),
};

pub const BINANCE_WALLET: WalletDescriptor = WalletDescriptor {
    identity: AdapterIdentity {
        name: "Binance Wallet",
        url: "https://www.binance.com/en/binancewallet",
        icon: include_str!("../assets/icons/binance.txt"),
    },
    injections: &[Injection::at("binancew3w.tron")],
    announcement: None,
    methods: WalletMethods {
        connect: Call::Method("getAccount"),
        address: AddressSource::ResultField("address"),
        authorized: AuthorizationProbe::Never,
        sign_message: Some(Call::Method("signMessageV2")),
        sign_transaction: Some(Call::Method("signTransaction")),
        multi_sign: None,
        switch_chain: None,
        network: Some(NetworkQuery::ChainId(Call::Method("getChainId"))),
        disconnect: Some(Call::Method("disconnect")),
    },
    events: EventSurface::None,
    deep_link: None,
};
