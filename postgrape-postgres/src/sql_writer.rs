use postgrape_core::{SqlWriter, writer::Context};
use std::fmt::Write;

#[derive(Default, Debug, Clone, Copy)]
pub struct PostgresSqlWriter {}

impl SqlWriter for PostgresSqlWriter {
    fn write_value_infinity(&self, _context: &mut Context, out: &mut String, negative: bool) {
        out.push_str(if negative {
            "'-Infinity'::FLOAT8"
        } else {
            "'Infinity'::FLOAT8"
        });
    }

    fn write_value_nan(&self, _context: &mut Context, out: &mut String) {
        out.push_str("'NaN'::FLOAT8");
    }

    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("decode('");
        for b in value {
            let _ = write!(out, "{:02x}", b);
        }
        out.push_str("', 'hex')");
    }
}
