//! Text rendering of a decoded FPU state.
//!
//! The layout follows the classic debugger convention: a compact two-line
//! status/control summary plus one row per stack register with the raw
//! sign/exponent and significand halves in hex. The decoder supplies every
//! field either mode needs; verbosity is selected entirely here.

use std::fmt;

use crate::decode::{Comparison, DecodedState};

/// Renders a [`DecodedState`] with a source-location label.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub state: &'a DecodedState,
    pub file: &'a str,
    pub line: u32,
    pub verbose: bool,
}

fn flag(b: bool) -> u8 {
    b as u8
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let control = &self.state.control;
        let status = &self.state.status;
        let cc = status.condition_codes;

        writeln!(f, "=================== x87 FPU state ===================")?;
        writeln!(f, "From {} line {}:", self.file, self.line)?;

        if self.verbose {
            writeln!(f)?;
            writeln!(f, "Status: {:#06X}", status.raw)?;
            writeln!(
                f,
                "   Invalid: {}, Denorm: {}, Zero div: {}",
                flag(status.invalid),
                flag(status.denormal),
                flag(status.zero_divide)
            )?;
            writeln!(
                f,
                "   Overflow: {}, Underflow: {}, Precision: {}",
                flag(status.overflow),
                flag(status.underflow),
                flag(status.precision)
            )?;
            writeln!(
                f,
                "   Stack fault: {}, Error summary: {}, Busy: {}, TOP: {}",
                flag(status.stack_fault),
                flag(status.error_summary),
                flag(status.busy),
                status.top
            )?;
            writeln!(
                f,
                "   C3: {}, C2: {}, C1: {}, C0: {}",
                flag(cc.c3),
                flag(cc.c2),
                flag(cc.c1),
                flag(cc.c0)
            )?;

            writeln!(f)?;
            writeln!(f, "Control: {:#06X}", control.raw)?;
            writeln!(
                f,
                "   Invalid mask: {}, Denorm mask: {}, Zero div mask: {}",
                flag(control.invalid_mask),
                flag(control.denormal_mask),
                flag(control.zero_divide_mask)
            )?;
            writeln!(
                f,
                "   Overflow mask: {}, Underflow mask: {}, Precision mask: {}",
                flag(control.overflow_mask),
                flag(control.underflow_mask),
                flag(control.precision_mask)
            )?;
            writeln!(
                f,
                "   Rounding: {}, Precision: {}, Infinity: {}",
                control.rounding.mnemonic(),
                precision_label(control.precision.mantissa_bits()),
                flag(control.infinity_control)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "                  3 2 1 0      E S P U O Z D I")?;
        writeln!(
            f,
            "   FST {:04X}  Cond {} {} {} {}  Err {} {} {} {} {} {} {} {}  {}",
            status.raw,
            flag(cc.c3),
            flag(cc.c2),
            flag(cc.c1),
            flag(cc.c0),
            flag(status.error_summary),
            flag(status.stack_fault),
            flag(status.precision),
            flag(status.underflow),
            flag(status.overflow),
            flag(status.zero_divide),
            flag(status.denormal),
            flag(status.invalid),
            comparison_label(self.state.comparison)
        )?;
        writeln!(
            f,
            "   FCW {:04X}  Prec {},{}  Mask    {} {} {} {} {} {}",
            control.raw,
            control.rounding.mnemonic(),
            precision_label(control.precision.mantissa_bits()),
            flag(control.precision_mask),
            flag(control.underflow_mask),
            flag(control.overflow_mask),
            flag(control.zero_divide_mask),
            flag(control.denormal_mask),
            flag(control.invalid_mask)
        )?;
        writeln!(f)?;

        for reg in &self.state.registers {
            writeln!(
                f,
                "ST{} {:>6} {:>26}   REG{}",
                reg.stack_index,
                reg.tag.mnemonic(),
                reg.value,
                reg.physical_index
            )?;
            writeln!(
                f,
                "               {:04X} {:08X} {:08X}",
                reg.sign_exponent, reg.mantissa_high, reg.mantissa_low
            )?;
            writeln!(f)?;
        }

        writeln!(f, "=====================================================")
    }
}

fn comparison_label(cmp: Comparison) -> &'static str {
    match cmp {
        Comparison::Unordered => "(Unordered)",
        Comparison::GreaterThan => "(GT)",
        Comparison::LessThan => "(LT)",
        Comparison::EqualOrUnsupported => "(EQ?)",
    }
}

fn precision_label(bits: Option<u32>) -> PrecisionLabel {
    PrecisionLabel(bits)
}

struct PrecisionLabel(Option<u32>);

impl fmt::Display for PrecisionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(bits) => write!(f, "{bits}"),
            None => f.write_str("?"),
        }
    }
}

/// Render to a `String` in one call.
pub fn render(state: &DecodedState, file: &str, line: u32, verbose: bool) -> String {
    Report {
        state,
        file,
        line,
        verbose,
    }
    .to_string()
}
