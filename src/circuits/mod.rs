// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! operations (`qfsm::operations::Operation`) over fixed-width quantum and
//! classical registers.

use crate::core::{ClbitId, FsmError, FsmResult, QubitId};
use crate::operations::Operation;
use std::collections::HashSet;
use std::fmt;

/// An ordered sequence of operations over `num_qubits` qubits and
/// `num_clbits` classical bits.
///
/// Unlike a circuit inferred from its operations, the registers here are
/// declared up front: idle wires (such as the unused output bits of the sensor
/// encoder) are still part of the circuit and are still measured.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    num_qubits: usize,
    num_clbits: usize,
    /// One display label per qubit wire.
    labels: Vec<String>,
    /// The order is significant: operations are applied front to back.
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates an empty circuit with default wire labels `q0, q1, ...`.
    pub fn new(num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            num_qubits,
            num_clbits,
            labels: (0..num_qubits).map(|i| format!("q{}", i)).collect(),
            operations: Vec::new(),
        }
    }

    /// Appends an operation after checking every referenced index against the
    /// registers.
    ///
    /// # Errors
    /// Returns `FsmError::InvalidOperation` if a qubit or classical bit is out of
    /// range, or if a controlled operation repeats a qubit.
    pub fn add_operation(&mut self, op: Operation) -> FsmResult<()> {
        let qubits = op.involved_qubits();
        for qubit in &qubits {
            if qubit.0 >= self.num_qubits {
                return Err(FsmError::invalid_operation(format!(
                    "{} is outside the {}-qubit register (operation: {})",
                    qubit, self.num_qubits, op
                )));
            }
        }
        let unique: HashSet<QubitId> = qubits.iter().copied().collect();
        if unique.len() != qubits.len() {
            return Err(FsmError::invalid_operation(format!(
                "Operation '{}' references the same qubit more than once",
                op
            )));
        }
        if let Some(clbit) = op.written_clbit() {
            if clbit.0 >= self.num_clbits {
                return Err(FsmError::invalid_operation(format!(
                    "{} is outside the {}-bit classical register",
                    clbit, self.num_clbits
                )));
            }
        }
        self.operations.push(op);
        Ok(())
    }

    /// Appends several operations, stopping at the first invalid one.
    pub fn add_operations<I>(&mut self, ops: I) -> FsmResult<()>
    where
        I: IntoIterator<Item = Operation>,
    {
        for op in ops {
            self.add_operation(op)?;
        }
        Ok(())
    }

    /// Replaces the display label of a wire. Out-of-range indices are ignored.
    pub fn set_label(&mut self, qubit: QubitId, label: impl Into<String>) {
        if let Some(slot) = self.labels.get_mut(qubit.0) {
            *slot = label.into();
        }
    }

    /// Number of qubits in the quantum register.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of bits in the classical register (the width of result bitstrings).
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// Display label of a wire.
    pub fn label(&self, qubit: QubitId) -> &str {
        self.labels.get(qubit.0).map(String::as_str).unwrap_or("?")
    }

    /// All wire labels, indexed by qubit.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns a slice containing the ordered sequence of operations.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Classical bits written by at least one measurement.
    pub fn measured_clbits(&self) -> Vec<ClbitId> {
        let mut clbits: Vec<ClbitId> = self.operations.iter().filter_map(Operation::written_clbit).collect();
        clbits.sort();
        clbits.dedup();
        clbits
    }

    /// Returns the total number of operations defined in the circuit.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the circuit contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper struct for programmatically constructing `Circuit` instances using
/// method chaining. Validation is deferred to [`CircuitBuilder::build`] so that
/// chains stay infallible.
pub struct CircuitBuilder {
    circuit: Circuit,
    pending: Vec<Operation>,
    labels: Vec<(QubitId, String)>,
}

impl CircuitBuilder {
    /// Creates a builder for a circuit with the given register sizes.
    pub fn new(num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits, num_clbits),
            pending: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Adds a single operation to the circuit being built.
    pub fn add_op(mut self, op: Operation) -> Self {
        self.pending.push(op);
        self
    }

    /// Adds multiple operations from an iterator to the circuit being built.
    pub fn add_ops<I>(mut self, ops: I) -> Self
    where
        I: IntoIterator<Item = Operation>,
    {
        self.pending.extend(ops);
        self
    }

    /// Sets the display label of a wire.
    pub fn label(mut self, qubit: QubitId, label: impl Into<String>) -> Self {
        self.labels.push((qubit, label.into()));
        self
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    ///
    /// # Errors
    /// Returns the first `FsmError::InvalidOperation` raised by
    /// [`Circuit::add_operation`].
    pub fn build(self) -> FsmResult<Circuit> {
        let mut circuit = self.circuit;
        for (qubit, label) in self.labels {
            circuit.set_label(qubit, label);
        }
        circuit.add_operations(self.pending)?;
        Ok(circuit)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "qfsm::Circuit[{} operations on {} qubits, {} clbits]",
            self.operations.len(),
            self.num_qubits,
            self.num_clbits
        )?;
        if self.num_qubits == 0 {
            return Ok(());
        }

        let ops = &self.operations;
        let num_ops = ops.len();
        let num_rows = self.num_qubits;

        let max_label_width = self.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let label_padding = " ".repeat(max_label_width + 2); // Label + ": "

        const GATE_WIDTH: usize = 7; // e.g., "───H───"
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] holds the wire segment; v_connect[row][time] the connector below it
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_rows];
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_rows];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre_dashes),
                    symbol,
                    H_WIRE.to_string().repeat(post_dashes)
                )
            }
        }

        for (t, op) in ops.iter().enumerate() {
            match op {
                Operation::Apply { gate, target } => {
                    op_grid[target.0][t] = format_gate(gate.symbol());
                }
                Operation::Controlled { gate, controls, target } => {
                    for control in controls {
                        op_grid[control.0][t] = format_gate("●");
                    }
                    let target_symbol = if *gate == crate::operations::Gate::X { "⊕" } else { gate.symbol() };
                    op_grid[target.0][t] = format_gate(target_symbol);

                    let rows = controls.iter().chain(std::iter::once(target)).map(|q| q.0);
                    let r_min = rows.clone().min().unwrap_or(target.0);
                    let r_max = rows.max().unwrap_or(target.0);
                    for row_vec in v_connect.iter_mut().take(r_max).skip(r_min) {
                        row_vec[t] = V_WIRE;
                    }
                    // Wires crossed by the connector but not part of the gate
                    for row in (r_min + 1)..r_max {
                        if op_grid[row][t] == WIRE {
                            op_grid[row][t] = format_gate("┼");
                        }
                    }
                }
                Operation::Measure { qubit, clbit } => {
                    op_grid[qubit.0][t] = format_gate(&format!("M{}", clbit.0));
                }
            }
        }

        for r in 0..num_rows {
            let label = format!("{}: ", self.labels[r]);
            write!(f, "{:<width$}", label, width = max_label_width + 2)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_rows - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let connector = v_connect[r][t];
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), connector, " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::Gate;

    #[test]
    fn test_builder_rejects_out_of_range_qubit() {
        let err = CircuitBuilder::new(2, 1).add_op(Operation::x(QubitId(2))).build().unwrap_err();
        assert!(matches!(err, FsmError::InvalidOperation { .. }));
    }

    #[test]
    fn test_builder_rejects_out_of_range_clbit() {
        let err = CircuitBuilder::new(2, 1)
            .add_op(Operation::measure(QubitId(0), ClbitId(1)))
            .build()
            .unwrap_err();
        assert!(matches!(err, FsmError::InvalidOperation { .. }));
    }

    #[test]
    fn test_builder_rejects_target_in_controls() {
        let err = CircuitBuilder::new(3, 1)
            .add_op(Operation::mcx(vec![QubitId(0), QubitId(2)], QubitId(2)))
            .build()
            .unwrap_err();
        assert!(matches!(err, FsmError::InvalidOperation { .. }));
    }

    #[test]
    fn test_measured_clbits_sorted_and_deduplicated() -> FsmResult<()> {
        let circuit = CircuitBuilder::new(2, 2)
            .add_op(Operation::measure(QubitId(1), ClbitId(1)))
            .add_op(Operation::measure(QubitId(0), ClbitId(0)))
            .add_op(Operation::measure(QubitId(0), ClbitId(1)))
            .build()?;
        assert_eq!(circuit.measured_clbits(), vec![ClbitId(0), ClbitId(1)]);
        Ok(())
    }

    #[test]
    fn test_display_contains_labels_and_symbols() -> FsmResult<()> {
        let circuit = CircuitBuilder::new(3, 1)
            .label(QubitId(0), "s0")
            .add_op(Operation::Apply { gate: Gate::H, target: QubitId(0) })
            .add_op(Operation::mcx(vec![QubitId(0)], QubitId(2)))
            .add_op(Operation::measure(QubitId(2), ClbitId(0)))
            .build()?;
        let text = circuit.to_string();
        assert!(text.contains("s0: "));
        assert!(text.contains("q2: "));
        assert!(text.contains('H'));
        assert!(text.contains('●'));
        assert!(text.contains('⊕'));
        assert!(text.contains("M0"));
        assert!(text.contains('┼'), "idle q1 should show the crossing connector");
        Ok(())
    }
}
