//! Per-opcode gas attribution for struct-log traces.
//!
//! Non-call opcodes are charged their declared `gasCost`. For CALL,
//! DELEGATECALL and STATICCALL the declared cost is only the gas offered
//! to the callee, so the realised cost is reconstructed by diffing the gas
//! remaining across the call boundary.

mod attributor;

pub use attributor::{
    Attribution, AttributionMode, CallPending, GasAttributor, GasContribution,
};
