use crate::parser::LogEntry;
use crate::utils::config::is_call_opcode;
use crate::utils::error::AttributionError;
use log::debug;
use serde::{Deserialize, Serialize};

/// How call-type opcodes are reconciled
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum AttributionMode {
    /// One pending call, resolved at the very next entry.
    ///
    /// Same depth: `prevGas - curGas`. Deeper: `allocated - curGas`, measured
    /// at the callee's first instruction, so only the call overhead is charged.
    #[default]
    SingleSlot,

    /// Pending calls kept on a stack keyed by depth.
    ///
    /// A call that enters a frame stays pending until execution comes back
    /// to the caller's depth and is then charged `allocated - curGas`.
    /// Calls nested inside the callee resolve independently.
    FrameStack,

    /// Every entry contributes its declared `gasCost`, calls included.
    /// Used by the per-transaction fallback path.
    #[value(skip)]
    Declared,
}

/// One `(opcode, cost)` contribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasContribution {
    pub opcode: String,
    pub cost: u64,
}

impl GasContribution {
    fn declared(entry: &LogEntry) -> Self {
        Self {
            opcode: entry.op.clone(),
            cost: entry.gas_cost,
        }
    }
}

/// A call-type opcode whose realised cost is not known yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPending {
    /// CALL, DELEGATECALL or STATICCALL
    pub operation: String,

    /// Declared gasCost of the call entry
    pub gas_allocated: u64,

    /// The call entry itself
    pub preceding: LogEntry,
}

impl CallPending {
    fn from_entry(entry: &LogEntry) -> Self {
        Self {
            operation: entry.op.clone(),
            gas_allocated: entry.gas_cost,
            preceding: entry.clone(),
        }
    }

    fn depth(&self) -> u32 {
        self.preceding.depth
    }

    /// Charge the call `cost`, rejecting negative results
    fn resolve(self, current: &LogEntry, cost: i128) -> Result<GasContribution, AttributionError> {
        match u64::try_from(cost) {
            Ok(cost) => Ok(GasContribution {
                opcode: self.operation,
                cost,
            }),
            Err(_) => Err(AttributionError::InvariantViolation {
                operation: self.operation,
                cost,
                preceding: Box::new(self.preceding),
                current: Box::new(current.clone()),
            }),
        }
    }

    /// The call did not open a frame: cost is the gas consumed across it
    fn resolve_in_place(self, current: &LogEntry) -> Result<GasContribution, AttributionError> {
        let cost = i128::from(self.preceding.gas) - i128::from(current.gas);
        self.resolve(current, cost)
    }

    /// The call opened a frame: cost is the allocation minus what `current` has left
    fn resolve_from_allocation(
        self,
        current: &LogEntry,
    ) -> Result<GasContribution, AttributionError> {
        let cost = i128::from(self.gas_allocated) - i128::from(current.gas);
        self.resolve(current, cost)
    }
}

/// Result of attributing one transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribution {
    /// Contributions in trace order (calls appear where they resolve)
    pub contributions: Vec<GasContribution>,

    /// Calls still pending when the trace ended; they contribute nothing
    pub unresolved: Vec<CallPending>,
}

#[derive(Debug)]
struct Frame {
    call: CallPending,
    entered: bool,
}

/// Converts a transaction's log entries into per-opcode contributions
#[derive(Debug, Clone, Copy, Default)]
pub struct GasAttributor {
    mode: AttributionMode,
}

impl GasAttributor {
    pub fn new(mode: AttributionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AttributionMode {
        self.mode
    }

    /// Attribute the ordered entries of one transaction.
    ///
    /// Pending state lives only for the duration of this call, so nothing
    /// carries over between transactions.
    ///
    /// # Errors
    /// * `AttributionError::InvariantViolation` - a reconciled call cost is negative
    pub fn attribute(&self, entries: &[LogEntry]) -> Result<Attribution, AttributionError> {
        let attribution = match self.mode {
            AttributionMode::SingleSlot => attribute_single_slot(entries)?,
            AttributionMode::FrameStack => attribute_frame_stack(entries)?,
            AttributionMode::Declared => Attribution {
                contributions: entries.iter().map(GasContribution::declared).collect(),
                unresolved: Vec::new(),
            },
        };

        debug!(
            "Attributed {} entries into {} contributions ({} unresolved calls)",
            entries.len(),
            attribution.contributions.len(),
            attribution.unresolved.len()
        );

        Ok(attribution)
    }
}

fn attribute_single_slot(entries: &[LogEntry]) -> Result<Attribution, AttributionError> {
    let mut contributions = Vec::with_capacity(entries.len());
    let mut pending: Option<CallPending> = None;

    for entry in entries {
        if let Some(call) = pending.take() {
            let contribution = if entry.depth == call.depth() {
                call.resolve_in_place(entry)?
            } else {
                call.resolve_from_allocation(entry)?
            };
            contributions.push(contribution);
        }

        if is_call_opcode(&entry.op) {
            pending = Some(CallPending::from_entry(entry));
            continue;
        }

        contributions.push(GasContribution::declared(entry));
    }

    Ok(Attribution {
        contributions,
        unresolved: pending.into_iter().collect(),
    })
}

fn attribute_frame_stack(entries: &[LogEntry]) -> Result<Attribution, AttributionError> {
    let mut contributions = Vec::with_capacity(entries.len());
    let mut frames: Vec<Frame> = Vec::new();

    for entry in entries {
        // A call issued by the previous entry: either it opened a frame or it is done.
        if frames.last().is_some_and(|frame| !frame.entered) {
            if let Some(mut frame) = frames.pop() {
                if entry.depth > frame.call.depth() {
                    frame.entered = true;
                    frames.push(frame);
                } else {
                    contributions.push(frame.call.resolve_in_place(entry)?);
                }
            }
        }

        // Frames whose callee has returned to (or below) the caller's depth.
        while frames
            .last()
            .is_some_and(|frame| entry.depth <= frame.call.depth())
        {
            if let Some(frame) = frames.pop() {
                contributions.push(frame.call.resolve_from_allocation(entry)?);
            }
        }

        if is_call_opcode(&entry.op) {
            frames.push(Frame {
                call: CallPending::from_entry(entry),
                entered: false,
            });
            continue;
        }

        contributions.push(GasContribution::declared(entry));
    }

    Ok(Attribution {
        contributions,
        unresolved: frames.into_iter().map(|frame| frame.call).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(op: &str, gas: u64, gas_cost: u64, depth: u32) -> LogEntry {
        LogEntry::new(op, gas, gas_cost, depth)
    }

    fn costs(attribution: &Attribution) -> Vec<(&str, u64)> {
        attribution
            .contributions
            .iter()
            .map(|c| (c.opcode.as_str(), c.cost))
            .collect()
    }

    #[test]
    fn test_plain_opcodes_use_declared_cost() {
        let entries = vec![
            entry("PUSH1", 100, 3, 1),
            entry("SLOAD", 97, 2100, 1),
            entry("STOP", 0, 0, 1),
        ];

        for mode in [AttributionMode::SingleSlot, AttributionMode::FrameStack] {
            let attribution = GasAttributor::new(mode).attribute(&entries).unwrap();
            assert_eq!(
                costs(&attribution),
                vec![("PUSH1", 3), ("SLOAD", 2100), ("STOP", 0)]
            );
            assert!(attribution.unresolved.is_empty());
        }
    }

    #[test]
    fn test_single_slot_nested_call_charged_at_callee_entry() {
        let entries = vec![
            entry("CALL", 10_000, 1_000, 1),
            entry("PUSH1", 900, 3, 2),
            entry("STOP", 897, 0, 2),
            entry("POP", 9_500, 2, 1),
        ];

        let attribution = GasAttributor::new(AttributionMode::SingleSlot)
            .attribute(&entries)
            .unwrap();

        assert_eq!(
            costs(&attribution),
            vec![("CALL", 100), ("PUSH1", 3), ("STOP", 0), ("POP", 2)]
        );
    }

    #[test]
    fn test_frame_stack_waits_for_return() {
        let entries = vec![
            entry("CALL", 10_000, 1_000, 1),
            entry("PUSH1", 900, 3, 2),
            entry("STOP", 897, 0, 2),
            entry("POP", 600, 2, 1),
        ];

        let attribution = GasAttributor::new(AttributionMode::FrameStack)
            .attribute(&entries)
            .unwrap();

        assert_eq!(
            costs(&attribution),
            vec![("PUSH1", 3), ("STOP", 0), ("CALL", 400), ("POP", 2)]
        );
    }

    #[test]
    fn test_declared_mode_charges_allocation() {
        let entries = vec![entry("CALL", 10_000, 1_000, 1), entry("POP", 9_000, 2, 1)];

        let attribution = GasAttributor::new(AttributionMode::Declared)
            .attribute(&entries)
            .unwrap();

        assert_eq!(costs(&attribution), vec![("CALL", 1_000), ("POP", 2)]);
    }

    #[test]
    fn test_trailing_call_is_unresolved() {
        let entries = vec![entry("PUSH1", 100, 3, 1), entry("STATICCALL", 97, 50, 1)];

        for mode in [AttributionMode::SingleSlot, AttributionMode::FrameStack] {
            let attribution = GasAttributor::new(mode).attribute(&entries).unwrap();
            assert_eq!(costs(&attribution), vec![("PUSH1", 3)]);
            assert_eq!(attribution.unresolved.len(), 1);
            assert_eq!(attribution.unresolved[0].operation, "STATICCALL");
            assert_eq!(attribution.unresolved[0].gas_allocated, 50);
        }
    }

    #[test]
    fn test_negative_cost_is_rejected() {
        // Gas remaining goes up across a call that did not enter a frame.
        let entries = vec![entry("CALL", 1_000, 700, 1), entry("POP", 1_200, 2, 1)];

        for mode in [AttributionMode::SingleSlot, AttributionMode::FrameStack] {
            let err = GasAttributor::new(mode).attribute(&entries).unwrap_err();
            let AttributionError::InvariantViolation {
                operation,
                cost,
                preceding,
                current,
            } = err;
            assert_eq!(operation, "CALL");
            assert_eq!(cost, -200);
            assert_eq!(preceding.gas, 1_000);
            assert_eq!(current.op, "POP");
        }
    }
}
