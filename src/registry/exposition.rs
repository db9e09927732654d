//! Prometheus text exposition format (version 0.0.4).
//!
//! Rendering is a pure function of a [`RegistrySnapshot`]: families come out
//! in name order and series in label order, so identical state always yields
//! identical bytes.

use super::snapshot::{FamilySnapshot, RegistrySnapshot, SampleValue};
use std::fmt::Write;

/// `Content-Type` for the exposition body.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Render a snapshot in the text exposition format.
pub fn render(snapshot: &RegistrySnapshot) -> String {
    // ---
    let mut out = String::new();
    for family in &snapshot.families {
        render_family(&mut out, family);
    }
    out
}

fn render_family(out: &mut String, family: &FamilySnapshot) {
    let name = &family.name;

    if !family.help.is_empty() {
        let _ = writeln!(out, "# HELP {name} {}", escape_help(&family.help));
    }
    let _ = writeln!(out, "# TYPE {name} {}", family.kind);

    for series in &family.samples {
        let pairs: Vec<(&str, &str)> = family
            .label_names
            .iter()
            .map(String::as_str)
            .zip(series.label_values.iter().map(String::as_str))
            .collect();

        match &series.value {
            SampleValue::Counter(v) | SampleValue::Gauge(v) => {
                let labels = label_block(&pairs, None);
                let _ = writeln!(out, "{name}{labels} {}", format_value(*v));
            }
            SampleValue::Histogram { buckets, sum, count } => {
                for (bound, cumulative) in buckets {
                    let le = format_value(*bound);
                    let labels = label_block(&pairs, Some(le.as_str()));
                    let _ = writeln!(out, "{name}_bucket{labels} {cumulative}");
                }
                let inf = label_block(&pairs, Some("+Inf"));
                let _ = writeln!(out, "{name}_bucket{inf} {count}");

                let labels = label_block(&pairs, None);
                let _ = writeln!(out, "{name}_sum{labels} {}", format_value(*sum));
                let _ = writeln!(out, "{name}_count{labels} {count}");
            }
        }
    }
}

/// `{a="1",b="2"}`, with an optional trailing `le`. Empty when there is nothing to print.
fn label_block(pairs: &[(&str, &str)], le: Option<&str>) -> String {
    if pairs.is_empty() && le.is_none() {
        return String::new();
    }

    let mut block = String::from("{");
    let mut first = true;
    for (name, value) in pairs.iter().copied().chain(le.map(|le| ("le", le))) {
        if !first {
            block.push(',');
        }
        first = false;
        let _ = write!(block, "{name}=\"{}\"", escape_label_value(value));
    }
    block.push('}');
    block
}

fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}
