#![no_main]
use alloy_sol_types::SolCall;
use libfuzzer_sys::fuzz_target;
use microloan_deployer::{
    primitives::U256,
    IMicroloanPlatform::getLoanCounterCall,
};

fuzz_target!(|data: &[u8]| {
    // Return data from an arbitrary contract must decode or error, never panic
    let Ok(decoded) = getLoanCounterCall::abi_decode_returns(data, true) else {
        return;
    };

    assert!(data.len() >= 32);
    assert_eq!(decoded._0, U256::from_be_slice(&data[..32]));
});
