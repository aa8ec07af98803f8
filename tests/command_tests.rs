use opcode_gas_scan::attribution::AttributionMode;
use opcode_gas_scan::commands::{execute_inspect, validate_args, InspectArgs, ScanArgs};
use opcode_gas_scan::utils::config::Chain;

fn valid_args() -> ScanArgs {
    ScanArgs {
        chain: Chain::Optimism,
        start_block: 100,
        end_block: 200,
        ..Default::default()
    }
}

#[test]
fn test_validate_args_valid() {
    assert!(validate_args(&valid_args()).is_ok());
}

#[test]
fn test_validate_args_single_block() {
    let args = ScanArgs {
        start_block: 100,
        end_block: 100,
        ..valid_args()
    };
    assert!(validate_args(&args).is_ok());
}

#[test]
fn test_validate_args_empty_rpc() {
    let args = ScanArgs {
        rpc_url: Some(String::new()),
        ..valid_args()
    };
    assert!(validate_args(&args).is_err());
}

#[test]
fn test_validate_args_https_rpc() {
    let args = ScanArgs {
        rpc_url: Some("https://node.example:8545".to_string()),
        attribution: AttributionMode::FrameStack,
        ..valid_args()
    };
    assert!(validate_args(&args).is_ok());
}

#[test]
fn test_validate_args_checkpoint_past_end() {
    let args = ScanArgs {
        checkpoint: Some(201),
        ..valid_args()
    };
    assert!(validate_args(&args).is_err());
}

#[test]
fn test_validate_args_checkpoint_at_end() {
    let args = ScanArgs {
        checkpoint: Some(200),
        ..valid_args()
    };
    assert!(validate_args(&args).is_ok());
}

#[test]
fn test_validate_args_top_zero() {
    let args = ScanArgs {
        top_opcodes: 0,
        ..valid_args()
    };
    assert!(validate_args(&args).is_err());
}

#[test]
fn test_inspect_missing_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let args = InspectArgs {
        dir: dir.path().join("base/1_2"),
        top_opcodes: Some(10),
    };

    let error = execute_inspect(&args).unwrap_err();
    assert!(error.to_string().contains("Failed to load snapshot"));
}
