use opcode_gas_scan::aggregator::OpcodeStats;
use opcode_gas_scan::attribution::{Attribution, AttributionMode, GasAttributor};
use opcode_gas_scan::parser::LogEntry;
use opcode_gas_scan::utils::error::AttributionError;
use pretty_assertions::assert_eq;

fn entry(op: &str, gas: u64, gas_cost: u64, depth: u32) -> LogEntry {
    LogEntry::new(op, gas, gas_cost, depth)
}

fn costs(attribution: &Attribution) -> Vec<(String, u64)> {
    attribution
        .contributions
        .iter()
        .map(|c| (c.opcode.clone(), c.cost))
        .collect()
}

fn owned(pairs: &[(&str, u64)]) -> Vec<(String, u64)> {
    pairs.iter().map(|(op, cost)| (op.to_string(), *cost)).collect()
}

#[test]
fn test_totals_match_declared_costs_without_calls() {
    let entries = vec![
        entry("PUSH1", 30_000, 3, 1),
        entry("PUSH1", 29_997, 3, 1),
        entry("SSTORE", 29_994, 20_000, 1),
        entry("ADD", 9_994, 3, 1),
        entry("SLOAD", 9_991, 2_100, 1),
        entry("STOP", 7_891, 0, 1),
    ];

    for mode in [AttributionMode::SingleSlot, AttributionMode::FrameStack] {
        let attribution = GasAttributor::new(mode).attribute(&entries).unwrap();
        let mut stats = OpcodeStats::new();
        stats.record_attribution(&attribution);

        assert_eq!(stats.get("PUSH1").unwrap().total, 6.0);
        assert_eq!(stats.get("PUSH1").unwrap().count, 2);
        assert_eq!(stats.get("SSTORE").unwrap().total, 20_000.0);
        assert_eq!(stats.get("ADD").unwrap().total, 3.0);
        assert_eq!(stats.get("SLOAD").unwrap().total, 2_100.0);
        assert_eq!(stats.get("STOP").unwrap().total, 0.0);
    }
}

#[test]
fn test_call_without_frame_charged_gas_consumed() {
    // gasRemaining after = prev - 1000 + 200
    let entries = vec![
        entry("CALL", 5_000, 1_000, 1),
        entry("ISZERO", 4_200, 3, 1),
    ];

    for mode in [AttributionMode::SingleSlot, AttributionMode::FrameStack] {
        let attribution = GasAttributor::new(mode).attribute(&entries).unwrap();
        assert_eq!(costs(&attribution), owned(&[("CALL", 800), ("ISZERO", 3)]));
    }
}

#[test]
fn test_each_call_type_is_reconciled() {
    for op in ["CALL", "DELEGATECALL", "STATICCALL"] {
        let entries = vec![entry(op, 5_000, 2_600, 1), entry("POP", 4_900, 2, 1)];
        let attribution = GasAttributor::new(AttributionMode::SingleSlot)
            .attribute(&entries)
            .unwrap();
        assert_eq!(costs(&attribution), owned(&[(op, 100), ("POP", 2)]));
    }
}

#[test]
fn test_frame_stack_charges_allocation_minus_return_gas() {
    let entries = vec![
        entry("CALL", 50_000, 1_000, 1),
        entry("PUSH1", 990, 3, 2),
        entry("MSTORE", 987, 6, 2),
        entry("RETURN", 981, 0, 2),
        entry("POP", 700, 2, 1),
    ];

    let attribution = GasAttributor::new(AttributionMode::FrameStack)
        .attribute(&entries)
        .unwrap();

    let call_cost = attribution
        .contributions
        .iter()
        .find(|c| c.opcode == "CALL")
        .map(|c| c.cost);
    assert_eq!(call_cost, Some(1_000 - 700));
}

#[test]
fn test_single_slot_resolves_at_callee_entry() {
    let entries = vec![
        entry("CALL", 50_000, 1_000, 1),
        entry("PUSH1", 990, 3, 2),
        entry("RETURN", 987, 0, 2),
        entry("POP", 700, 2, 1),
    ];

    let attribution = GasAttributor::new(AttributionMode::SingleSlot)
        .attribute(&entries)
        .unwrap();

    assert_eq!(
        costs(&attribution),
        owned(&[("CALL", 10), ("PUSH1", 3), ("RETURN", 0), ("POP", 2)])
    );
}

#[test]
fn test_negative_in_place_cost_is_rejected() {
    let entries = vec![entry("CALL", 5_000, 1_000, 1), entry("POP", 6_000, 2, 1)];

    for mode in [AttributionMode::SingleSlot, AttributionMode::FrameStack] {
        match GasAttributor::new(mode).attribute(&entries) {
            Err(AttributionError::InvariantViolation {
                operation,
                cost,
                preceding,
                current,
            }) => {
                assert_eq!(operation, "CALL");
                assert_eq!(cost, -1_000);
                assert_eq!(preceding.gas, 5_000);
                assert_eq!(current.op, "POP");
            }
            other => panic!("expected invariant violation, got {:?}", other),
        }
    }
}

#[test]
fn test_negative_frame_cost_is_rejected() {
    let entries = vec![
        entry("STATICCALL", 90_000, 1_000, 1),
        entry("PUSH1", 990, 3, 2),
        entry("STOP", 987, 0, 2),
        entry("POP", 1_500, 2, 1),
    ];

    let result = GasAttributor::new(AttributionMode::FrameStack).attribute(&entries);
    assert!(matches!(
        result,
        Err(AttributionError::InvariantViolation { cost: -500, .. })
    ));
}

#[test]
fn test_nested_calls_resolve_independently_on_frame_stack() {
    let entries = vec![
        entry("CALL", 1_100, 1_000, 1),
        entry("STATICCALL", 990, 300, 2),
        entry("PUSH1", 290, 3, 3),
        entry("STOP", 287, 0, 3),
        entry("POP", 250, 2, 2),
        entry("STOP", 248, 0, 2),
        entry("POP", 600, 2, 1),
    ];

    let single = GasAttributor::new(AttributionMode::SingleSlot)
        .attribute(&entries)
        .unwrap();
    let stacked = GasAttributor::new(AttributionMode::FrameStack)
        .attribute(&entries)
        .unwrap();

    assert_eq!(
        costs(&single),
        owned(&[
            ("CALL", 10),
            ("STATICCALL", 10),
            ("PUSH1", 3),
            ("STOP", 0),
            ("POP", 2),
            ("STOP", 0),
            ("POP", 2),
        ])
    );
    assert_eq!(
        costs(&stacked),
        owned(&[
            ("PUSH1", 3),
            ("STOP", 0),
            ("STATICCALL", 50),
            ("POP", 2),
            ("STOP", 0),
            ("CALL", 400),
            ("POP", 2),
        ])
    );
}

#[test]
fn test_back_to_back_failed_calls() {
    let entries = vec![
        entry("CALL", 5_000, 100, 1),
        entry("CALL", 4_900, 200, 1),
        entry("POP", 4_750, 2, 1),
    ];

    for mode in [AttributionMode::SingleSlot, AttributionMode::FrameStack] {
        let attribution = GasAttributor::new(mode).attribute(&entries).unwrap();
        assert_eq!(
            costs(&attribution),
            owned(&[("CALL", 100), ("CALL", 150), ("POP", 2)])
        );
    }
}

#[test]
fn test_pending_call_does_not_cross_transactions() {
    let attributor = GasAttributor::new(AttributionMode::SingleSlot);
    let first = vec![entry("PUSH1", 100, 3, 1), entry("CALL", 97, 50, 1)];
    let second = vec![entry("ADD", 90_000, 3, 1)];

    let a = attributor.attribute(&first).unwrap();
    let b = attributor.attribute(&second).unwrap();

    assert_eq!(a.unresolved.len(), 1);
    assert_eq!(costs(&b), owned(&[("ADD", 3)]));
    assert!(b.unresolved.is_empty());
}

#[test]
fn test_empty_trace() {
    let attribution = GasAttributor::default().attribute(&[]).unwrap();
    assert_eq!(attribution, Attribution::default());
}
