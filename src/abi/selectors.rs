use alloy_primitives::keccak256;

/// Compute the Solidity function selector (first 4 bytes of keccak256(signature)).
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

// Notary
pub fn seal() -> [u8; 4] {
    function_selector("seal(address,bytes[],bytes)")
}

// Switchboard
pub fn register_sibling_slug() -> [u8; 4] {
    function_selector("registerSiblingSlug(uint32,uint256,uint256,address)")
}
pub fn fx_child_tunnel() -> [u8; 4] {
    function_selector("fxChildTunnel()")
}
pub fn set_fx_child_tunnel() -> [u8; 4] {
    function_selector("setFxChildTunnel(address)")
}

// Socket
pub fn capacitors() -> [u8; 4] {
    function_selector("capacitors__(address,uint32)")
}
pub fn decapacitors() -> [u8; 4] {
    function_selector("decapacitors__(address,uint32)")
}
pub fn execution_manager() -> [u8; 4] {
    function_selector("executionManager__()")
}
pub fn transmit_manager() -> [u8; 4] {
    function_selector("transmitManager__()")
}
pub fn set_execution_manager() -> [u8; 4] {
    function_selector("setExecutionManager(address)")
}
pub fn set_transmit_manager() -> [u8; 4] {
    function_selector("setTransmitManager(address)")
}

// Custom errors a notary reverts with when a packet was sealed before
pub fn already_attested() -> [u8; 4] {
    function_selector("AlreadyAttested()")
}
pub fn already_sealed() -> [u8; 4] {
    function_selector("AlreadySealed()")
}
