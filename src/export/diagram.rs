// src/export/diagram.rs

use super::render::Figure;
use crate::circuits::Circuit;
use crate::operations::{Gate, Operation};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

const LABEL_COLUMN: i32 = 72;
const COLUMN_WIDTH: i32 = 64;
const ROW_HEIGHT: i32 = 48;
const TOP_MARGIN: i32 = 56;
const BOTTOM_MARGIN: i32 = 28;
const SIDE_MARGIN: i32 = 24;
const BOX_HALF: i32 = 17;

const GATE_FILL: RGBColor = RGBColor(221, 232, 255);
const MEASURE_FILL: RGBColor = RGBColor(235, 235, 235);
const CLASSICAL_WIRE: RGBColor = RGBColor(110, 110, 110);

/// Pixel geometry of a circuit drawing: one row per qubit, one extra row for
/// the classical register, one column per operation.
struct Layout {
    num_qubits: usize,
    num_ops: usize,
}

impl Layout {
    fn size(&self) -> (u32, u32) {
        let width = LABEL_COLUMN + SIDE_MARGIN * 2 + COLUMN_WIDTH * self.num_ops.max(1) as i32;
        let height = TOP_MARGIN + ROW_HEIGHT * (self.num_qubits as i32 + 1) + BOTTOM_MARGIN;
        (width as u32, height as u32)
    }

    fn wire_start(&self) -> i32 {
        LABEL_COLUMN
    }

    fn wire_end(&self) -> i32 {
        self.size().0 as i32 - SIDE_MARGIN
    }

    fn row_y(&self, row: usize) -> i32 {
        TOP_MARGIN + ROW_HEIGHT * row as i32 + ROW_HEIGHT / 2
    }

    fn classical_y(&self) -> i32 {
        self.row_y(self.num_qubits)
    }

    fn column_x(&self, column: usize) -> i32 {
        LABEL_COLUMN + SIDE_MARGIN + COLUMN_WIDTH * column as i32 + COLUMN_WIDTH / 2
    }
}

/// A circuit drawn as wires with gate boxes, control dots, targets and
/// measurements feeding the classical register.
pub(crate) struct CircuitDiagram<'a> {
    circuit: &'a Circuit,
    layout: Layout,
}

impl<'a> CircuitDiagram<'a> {
    pub(crate) fn new(circuit: &'a Circuit) -> Self {
        let layout = Layout { num_qubits: circuit.num_qubits(), num_ops: circuit.len() };
        Self { circuit, layout }
    }
}

impl Figure for CircuitDiagram<'_> {
    fn size(&self) -> (u32, u32) {
        self.layout.size()
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let (circuit, layout) = (self.circuit, &self.layout);
        let title_style = TextStyle::from(("sans-serif", 18).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
        let label_style = TextStyle::from(("sans-serif", 15).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
        let gate_style = TextStyle::from(("sans-serif", 16).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
        let small_style = TextStyle::from(("sans-serif", 11).into_font()).pos(Pos::new(HPos::Left, VPos::Top));

        root.draw(&Text::new(
            format!("{} qubits, {} classical bits, {} operations", circuit.num_qubits(), circuit.num_clbits(), circuit.len()),
            (SIDE_MARGIN, TOP_MARGIN / 2),
            title_style,
        ))?;

        // Wires
        for (row, label) in circuit.labels().iter().enumerate() {
            let y = layout.row_y(row);
            root.draw(&Text::new(label.clone(), (SIDE_MARGIN, y), label_style.clone()))?;
            root.draw(&PathElement::new(vec![(layout.wire_start(), y), (layout.wire_end(), y)], BLACK.stroke_width(1)))?;
        }
        let cy = layout.classical_y();
        root.draw(&Text::new(format!("c/{}", circuit.num_clbits()), (SIDE_MARGIN, cy), label_style.clone()))?;
        for dy in [-2, 2] {
            root.draw(&PathElement::new(
                vec![(layout.wire_start(), cy + dy), (layout.wire_end(), cy + dy)],
                CLASSICAL_WIRE.stroke_width(1),
            ))?;
        }

        for (column, op) in circuit.operations().iter().enumerate() {
            let x = layout.column_x(column);
            match op {
                Operation::Apply { gate, target } => {
                    draw_gate_box(root, (x, layout.row_y(target.0)), gate.symbol(), GATE_FILL, &gate_style)?;
                }
                Operation::Controlled { gate, controls, target } => {
                    let rows = controls.iter().chain(std::iter::once(target)).map(|q| layout.row_y(q.0));
                    let top = rows.clone().min().unwrap_or(layout.row_y(target.0));
                    let bottom = rows.max().unwrap_or(layout.row_y(target.0));
                    root.draw(&PathElement::new(vec![(x, top), (x, bottom)], BLACK.stroke_width(2)))?;
                    for control in controls {
                        root.draw(&Circle::new((x, layout.row_y(control.0)), 6, BLACK.filled()))?;
                    }
                    let ty = layout.row_y(target.0);
                    if *gate == Gate::X {
                        // Target of a controlled NOT: circled plus
                        root.draw(&Circle::new((x, ty), 13, WHITE.filled()))?;
                        root.draw(&Circle::new((x, ty), 13, BLACK.stroke_width(2)))?;
                        root.draw(&PathElement::new(vec![(x - 13, ty), (x + 13, ty)], BLACK.stroke_width(2)))?;
                        root.draw(&PathElement::new(vec![(x, ty - 13), (x, ty + 13)], BLACK.stroke_width(2)))?;
                    } else {
                        draw_gate_box(root, (x, ty), gate.symbol(), GATE_FILL, &gate_style)?;
                    }
                }
                Operation::Measure { qubit, clbit } => {
                    let qy = layout.row_y(qubit.0);
                    root.draw(&PathElement::new(vec![(x - 2, qy), (x - 2, cy)], CLASSICAL_WIRE.stroke_width(1)))?;
                    root.draw(&PathElement::new(vec![(x + 2, qy), (x + 2, cy)], CLASSICAL_WIRE.stroke_width(1)))?;
                    root.draw(&PathElement::new(vec![(x - 6, cy - 8), (x, cy - 2), (x + 6, cy - 8)], CLASSICAL_WIRE.stroke_width(1)))?;
                    root.draw(&Text::new(clbit.0.to_string(), (x + 5, cy + 5), small_style.clone()))?;
                    draw_gate_box(root, (x, qy), "M", MEASURE_FILL, &gate_style)?;
                }
            }
        }
        Ok(())
    }
}

fn draw_gate_box<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    (x, y): (i32, i32),
    symbol: &str,
    fill: RGBColor,
    style: &TextStyle<'_>,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let corners = [(x - BOX_HALF, y - BOX_HALF), (x + BOX_HALF, y + BOX_HALF)];
    root.draw(&Rectangle::new(corners, fill.filled()))?;
    root.draw(&Rectangle::new(corners, BLACK.stroke_width(1)))?;
    root.draw(&Text::new(symbol.to_string(), (x, y), style.clone()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FsmResult;
    use crate::encoder::{SensorStateEncoder, SensorVector};
    use crate::export::render::{ImageFormat, render, render_svg, svg_text_nodes};

    #[test]
    fn test_layout_grows_with_circuit() {
        let small = Layout { num_qubits: 2, num_ops: 1 }.size();
        let large = Layout { num_qubits: 9, num_ops: 10 }.size();
        assert!(large.0 > small.0);
        assert!(large.1 > small.1);
        let empty = Layout { num_qubits: 1, num_ops: 0 }.size();
        assert!(empty.0 > 0 && empty.1 > 0);
    }

    #[test]
    fn test_encoded_circuit_text_nodes() -> FsmResult<()> {
        let circuit = SensorStateEncoder::new().encode(&SensorVector::all_abnormal())?;
        let texts = svg_text_nodes(&render_svg(&CircuitDiagram::new(&circuit))?);
        for label in ["s0", "s5", "Q2", "Q0", "c/3", "X", "M"] {
            assert!(texts.iter().any(|t| t == label), "missing text {} in {:?}", label, texts);
        }
        // One box per inversion on the six abnormal sensors, one per measurement
        assert_eq!(texts.iter().filter(|t| *t == "X").count(), 6);
        assert_eq!(texts.iter().filter(|t| *t == "M").count(), 3);
        Ok(())
    }

    #[test]
    fn test_png_diagram() -> FsmResult<()> {
        let circuit = SensorStateEncoder::new().encode(&SensorVector::all_normal())?;
        let png = render(&CircuitDiagram::new(&circuit), ImageFormat::Png)?;
        assert!(png.starts_with(b"\x89PNG"));
        Ok(())
    }
}
