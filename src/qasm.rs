//! OpenQASM 3 export utilities.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write as IoWrite;
use std::path::Path;

use num_traits::ToPrimitive;

use crate::builder::{BuilderCircuitObjectType, LocalBuilder, MeasurementObject, UnitaryMatrixObject};
use crate::builder_traits::CircuitBuilder;
use crate::types::Precision;

/// Exports a circuit to OpenQASM 3 text.
pub trait ToOpenQasm {
    /// Returns the circuit as OpenQASM 3 text.
    fn to_openqasm(&self) -> String;
}

impl<P> ToOpenQasm for LocalBuilder<P>
where
    P: Precision + ToPrimitive,
{
    fn to_openqasm(&self) -> String {
        let pipeline = self.pipeline();

        // Classical register size: one bit per collapsed measurement.
        let mut measured: Vec<usize> = pipeline
            .iter()
            .filter_map(|(indices, obj)| match obj.object() {
                BuilderCircuitObjectType::Measurement(MeasurementObject::Measurement) => {
                    Some(indices.as_slice())
                }
                _ => None,
            })
            .flat_map(|indices| indices.iter().copied())
            .collect();
        measured.sort_unstable();
        measured.dedup();
        let classical_map: HashMap<usize, usize> = measured
            .iter()
            .enumerate()
            .map(|(c, q)| (*q, c))
            .collect();

        let mut lines = vec![
            "OPENQASM 3.0;".to_string(),
            "include \"stdgates.inc\";".to_string(),
            format!("qubit[{}] q;", self.n()),
        ];
        if !measured.is_empty() {
            lines.push(format!("bit[{}] c;", measured.len()));
        }

        for (indices, obj) in pipeline {
            match obj.object() {
                BuilderCircuitObjectType::Unitary(u) => {
                    let (controls, targets) = indices.split_at(obj.controls().len());
                    let modifiers = control_modifiers(obj.controls());
                    let operands = controls
                        .iter()
                        .chain(targets)
                        .map(|q| format!("q[{}]", q))
                        .collect::<Vec<_>>()
                        .join(", ");
                    lines.push(format!("{}{} {};", modifiers, gate_name(u), operands));
                }
                BuilderCircuitObjectType::Measurement(m) => match m {
                    MeasurementObject::Measurement => {
                        lines.extend(indices.iter().filter_map(|q| {
                            classical_map
                                .get(q)
                                .map(|c| format!("c[{}] = measure q[{}];", c, q))
                        }));
                    }
                    // Probability tables have no OpenQASM counterpart; comment only.
                    MeasurementObject::StochasticMeasurement => {
                        lines.push(format!("// stochastic measurement over {:?}", indices));
                    }
                },
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

impl<P> LocalBuilder<P>
where
    P: Precision + ToPrimitive,
{
    /// Writes current circuit as OpenQASM 3 into `path`.
    pub fn write_openqasm_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let qasm = self.to_openqasm();
        let mut f = File::create(path)?;
        f.write_all(qasm.as_bytes())
    }
}

// --- helpers ---

fn gate_name<P: Precision + ToPrimitive>(u: &UnitaryMatrixObject<P>) -> String {
    match u {
        UnitaryMatrixObject::X => "x".to_string(),
        UnitaryMatrixObject::H => "h".to_string(),
        UnitaryMatrixObject::SWAP => "swap".to_string(),
        UnitaryMatrixObject::Ry(theta) => format!("ry({})", format_angle(*theta)),
    }
}

/// Runs of equal control values become `ctrl(n) @` or `negctrl(n) @`, in control order.
fn control_modifiers(controls: &[bool]) -> String {
    let mut runs: Vec<(bool, usize)> = vec![];
    for value in controls {
        match runs.last_mut() {
            Some((last, count)) if *last == *value => *count += 1,
            _ => runs.push((*value, 1)),
        }
    }
    runs.into_iter()
        .map(|(value, count)| {
            let name = if value { "ctrl" } else { "negctrl" };
            if count == 1 {
                format!("{} @ ", name)
            } else {
                format!("{}({}) @ ", name, count)
            }
        })
        .collect()
}

fn format_angle<P: Precision + ToPrimitive>(theta: P) -> String {
    // Decimal radians, trimmed.
    let f = theta.to_f64().unwrap_or(0.0);
    let s = format!("{:.12}", f);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

// =========================
//           TESTS
// =========================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder_traits::{CliffordBuilder, MeasurementBuilder, RotationsBuilder};
    use crate::conditioning::Conditionable;
    use crate::errors::CircuitResult;
    use std::fs;

    #[test]
    fn qasm_header_and_measure() -> CircuitResult<()> {
        let mut b = LocalBuilder::<f64>::default();
        let q0 = b.qubit();
        let q0 = b.h(q0)?;
        let (_q0, _mh) = b.measure(q0);

        let qasm = b.to_openqasm();
        assert!(qasm.starts_with("OPENQASM 3.0;"));
        assert!(qasm.contains("include \"stdgates.inc\";"));
        assert!(qasm.contains("qubit[1] q;"));
        assert!(qasm.lines().any(|l| l == "bit[1] c;"));
        assert!(qasm.contains("h q[0];"));
        assert!(qasm.contains("c[0] = measure q[0];"));
        Ok(())
    }

    #[test]
    fn qasm_mixed_controls() -> CircuitResult<()> {
        let mut b = LocalBuilder::<f64>::default();
        let cr = b.qudit(3).unwrap();
        let r = b.qubit();
        let mut c = b.condition_on_value(cr, 0b100)?;
        let _r = c.x(r)?;
        let _cr = c.dissolve()?;

        let qasm = b.to_openqasm();
        assert!(qasm.contains("ctrl @ negctrl(2) @ x q[0], q[1], q[2], q[3];"));
        assert!(qasm.contains("qubit[4] q;"));
        assert!(!qasm.lines().any(|l| l.starts_with("bit[")));
        Ok(())
    }

    #[test]
    fn qasm_rotation_and_swap() -> CircuitResult<()> {
        let mut b = LocalBuilder::<f64>::default();
        let ra = b.qubit();
        let rb = b.qubit();
        let ra = b.ry(ra, 0.5)?;
        let (_ra, _rb) = b.swap(ra, rb)?;

        let qasm = b.to_openqasm();
        assert!(qasm.contains("ry(0.5) q[0];"));
        assert!(qasm.contains("swap q[0], q[1];"));
        Ok(())
    }

    #[test]
    fn qasm_write_file() -> CircuitResult<()> {
        let mut b = LocalBuilder::<f64>::default();
        let q0 = b.qubit();
        let q1 = b.qubit();
        let mut c = b.condition_with(q0);
        let _q1 = c.x(q1)?;
        let q0 = c.dissolve()?;
        let (_q0, _m0) = b.measure(q0);

        let mut p = std::env::temp_dir();
        p.push("qwalk_test_export.qasm");

        b.write_openqasm_file(&p).unwrap();
        let text = fs::read_to_string(&p).unwrap();

        assert!(text.contains("qubit[2] q;"));
        assert!(text.contains("ctrl @ x q[0], q[1];"));
        assert!(text.contains("c[0] = measure q[0];"));

        let _ = fs::remove_file(p);
        Ok(())
    }
}
