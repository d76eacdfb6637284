use super::{ChainMeta, ChainSlug};

pub const ARBITRUM: ChainSlug = ChainSlug(42161);
pub const ARBITRUM_GOERLI: ChainSlug = ChainSlug(421613);
pub const ARBITRUM_SEPOLIA: ChainSlug = ChainSlug(421614);
pub const OPTIMISM: ChainSlug = ChainSlug(10);
pub const OPTIMISM_GOERLI: ChainSlug = ChainSlug(420);
pub const OPTIMISM_SEPOLIA: ChainSlug = ChainSlug(11155420);
pub const BSC: ChainSlug = ChainSlug(56);
pub const BSC_TESTNET: ChainSlug = ChainSlug(97);
pub const MAINNET: ChainSlug = ChainSlug(1);
pub const GOERLI: ChainSlug = ChainSlug(5);
pub const SEPOLIA: ChainSlug = ChainSlug(11155111);
pub const POLYGON_MAINNET: ChainSlug = ChainSlug(137);
pub const POLYGON_MUMBAI: ChainSlug = ChainSlug(80001);
pub const AEVO_TESTNET: ChainSlug = ChainSlug(11155112);
pub const AEVO: ChainSlug = ChainSlug(2999);
pub const HARDHAT: ChainSlug = ChainSlug(31337);
pub const AVALANCHE: ChainSlug = ChainSlug(43114);
pub const LYRA_TESTNET: ChainSlug = ChainSlug(901);
pub const LYRA: ChainSlug = ChainSlug(957);
/// Xai's chain id does not fit 32 bits, so it carries its own slug.
pub const XAI_TESTNET: ChainSlug = ChainSlug(1399904803);
pub const CDK_TESTNET: ChainSlug = ChainSlug(686669576);
pub const SX_NETWORK_TESTNET: ChainSlug = ChainSlug(647);
pub const MODE_TESTNET: ChainSlug = ChainSlug(919);
pub const VICTION_TESTNET: ChainSlug = ChainSlug(89);
pub const BASE: ChainSlug = ChainSlug(8453);
pub const MODE: ChainSlug = ChainSlug(34443);
pub const ANCIENT8_TESTNET: ChainSlug = ChainSlug(2863311531);
pub const ANCIENT8_TESTNET2: ChainSlug = ChainSlug(28122024);
pub const HOOK_TESTNET: ChainSlug = ChainSlug(46658378);
pub const HOOK: ChainSlug = ChainSlug(4665);
pub const PARALLEL: ChainSlug = ChainSlug(1024);
pub const MANTLE: ChainSlug = ChainSlug(5000);
pub const REYA_CRONOS: ChainSlug = ChainSlug(1729);

const fn mainnet(slug: ChainSlug, name: &'static str, confirmations: u64) -> ChainMeta {
    ChainMeta {
        slug,
        name,
        chain_id: slug.0 as u64,
        confirmations,
        is_testnet: false,
    }
}

const fn testnet(slug: ChainSlug, name: &'static str, confirmations: u64) -> ChainMeta {
    ChainMeta {
        slug,
        name,
        chain_id: slug.0 as u64,
        confirmations,
        is_testnet: true,
    }
}

/// Every supported chain with its confirmation depth.
pub static CHAINS: &[ChainMeta] = &[
    // Mainnets
    mainnet(MAINNET, "mainnet", 18),
    mainnet(ARBITRUM, "arbitrum", 1),
    mainnet(OPTIMISM, "optimism", 15),
    mainnet(BSC, "bsc", 1),
    mainnet(POLYGON_MAINNET, "polygon-mainnet", 256),
    mainnet(AEVO, "aevo", 2),
    mainnet(LYRA, "lyra", 2),
    mainnet(BASE, "base", 1),
    mainnet(MODE, "mode", 2),
    mainnet(AVALANCHE, "avalanche", 1),
    mainnet(HOOK, "hook", 1),
    mainnet(PARALLEL, "parallel", 1),
    mainnet(MANTLE, "mantle", 1),
    // Testnets
    testnet(GOERLI, "goerli", 1),
    testnet(SEPOLIA, "sepolia", 1),
    testnet(ARBITRUM_GOERLI, "arbitrum-goerli", 1),
    testnet(ARBITRUM_SEPOLIA, "arbitrum-sepolia", 1),
    testnet(OPTIMISM_GOERLI, "optimism-goerli", 1),
    testnet(OPTIMISM_SEPOLIA, "optimism-sepolia", 1),
    testnet(BSC_TESTNET, "bsc-testnet", 1),
    testnet(POLYGON_MUMBAI, "polygon-mumbai", 1),
    testnet(AEVO_TESTNET, "aevo-testnet", 1),
    testnet(LYRA_TESTNET, "lyra-testnet", 1),
    testnet(HARDHAT, "hardhat", 1),
    ChainMeta {
        slug: XAI_TESTNET,
        name: "xai-testnet",
        chain_id: 47_279_324_479,
        confirmations: 1,
        is_testnet: true,
    },
    testnet(CDK_TESTNET, "cdk-testnet", 1),
    testnet(SX_NETWORK_TESTNET, "sx-network-testnet", 1),
    testnet(MODE_TESTNET, "mode-testnet", 1),
    testnet(VICTION_TESTNET, "viction-testnet", 1),
    testnet(ANCIENT8_TESTNET, "ancient8-testnet", 1),
    testnet(ANCIENT8_TESTNET2, "ancient8-testnet2", 1),
    testnet(HOOK_TESTNET, "hook-testnet", 1),
    testnet(REYA_CRONOS, "reya-cronos", 1),
];
