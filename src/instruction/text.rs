//! @acp:module "Label Text"
//! @acp:summary "Resolves TX/TE label content against feature attributes"
//! @acp:domain symbology
//! @acp:layer logic

use regex::Regex;
use std::sync::LazyLock;

use super::command::{TextContent, TextSpec};
use crate::feature::Feature;
use crate::mariner::MarinerSnapshot;

/// Text groups below this are always-shown "important" text
pub const IMPORTANT_TEXT_LIMIT: u32 = 20;

/// printf-style conversion: `%s`, `%4.1lf`, `%-3d`, `%%`
static FORMAT_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%(-?)(\d*)(?:\.(\d+))?(l?[dfsi]|%)").expect("valid format regex")
});

/// Whether a label of `group` is displayed under the current parameters
pub fn is_text_visible(group: u32, params: &MarinerSnapshot) -> bool {
    params.show_text && (!params.important_text_only || group < IMPORTANT_TEXT_LIMIT)
}

/// Produce the display string of a text command, or `None` when hidden or
/// when a referenced attribute has no value.
pub fn resolve_text(spec: &TextSpec, feature: &Feature, params: &MarinerSnapshot) -> Option<String> {
    if !is_text_visible(spec.group, params) {
        return None;
    }

    let text = match &spec.content {
        TextContent::Literal(s) => s.clone(),
        TextContent::Attribute(name) => attribute_text(feature, name, params)?.to_string(),
        TextContent::Format { format, attributes } => {
            let values: Vec<&str> = attributes
                .iter()
                .map(|a| attribute_text(feature, a, params))
                .collect::<Option<_>>()?;
            apply_format(format, &values)?
        }
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Attribute value used as label text; national names replace `OBJNAM`
fn attribute_text<'a>(feature: &'a Feature, name: &str, params: &MarinerSnapshot) -> Option<&'a str> {
    if params.national_names && name == "OBJNAM" && feature.has_value("NOBJNM") {
        return feature.attribute("NOBJNM");
    }
    feature.attribute(name).filter(|_| feature.has_value(name))
}

/// Substitute `values` into a printf-style format, in order.
///
/// Returns `None` when a numeric conversion receives a non-numeric value
/// or when there are fewer values than conversions.
pub fn apply_format(format: &str, values: &[&str]) -> Option<String> {
    let mut out = String::with_capacity(format.len() + 16);
    let mut last = 0;
    let mut next_value = values.iter();

    for caps in FORMAT_SPEC.captures_iter(format) {
        let whole = caps.get(0)?;
        out.push_str(&format[last..whole.start()]);
        last = whole.end();

        let conversion = &caps[4];
        if conversion == "%" {
            out.push('%');
            continue;
        }

        let left = !caps[1].is_empty();
        let width: usize = caps[2].parse().unwrap_or(0);
        let precision: Option<usize> = caps.get(3).and_then(|m| m.as_str().parse().ok());
        let value = next_value.next()?.trim();

        let rendered = match conversion.trim_start_matches('l') {
            "d" | "i" => format!("{}", value.parse::<f64>().ok()?.trunc() as i64),
            "f" => {
                let v = value.parse::<f64>().ok()?;
                format!("{:.*}", precision.unwrap_or(6), v)
            }
            _ => match precision {
                Some(p) => value.chars().take(p).collect(),
                None => value.to_string(),
            },
        };

        if left {
            out.push_str(&format!("{:<width$}", rendered, width = width));
        } else {
            out.push_str(&format!("{:>width$}", rendered, width = width));
        }
    }

    out.push_str(&format[last..]);
    Some(out)
}
