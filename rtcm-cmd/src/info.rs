use std::collections::BTreeMap;
use std::io::{stdout, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use handlebars::handlebars_helper;
use rtcm3::framing::FrameReader;
use rtcm3::messages::Constellation;
use rtcm3::{DecodedMessage, Registry};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Default, Debug, Clone, Serialize)]
struct TypeSummary {
    count: usize,
    errors: usize,
    bytes: usize,
    registered: bool,
    description: String,
}

#[derive(Default, Debug, Clone, Serialize)]
struct Summary {
    total_frames: usize,
    total_bytes: usize,
    resyncs: usize,
    skipped_bytes: usize,
    decode_errors: usize,
    unknown_messages: usize,
    read_errors: usize,
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    summary: Summary,
    types: BTreeMap<u16, TypeSummary>,
}

fn describe(type_code: u16) -> String {
    if let Some(constellation) = Constellation::from_type_code(type_code) {
        return format!("{constellation:?} MSM{}", type_code % 10);
    }
    match type_code {
        1005 => "Station ARP",
        1006 => "Station ARP with height",
        1013 => "System parameters",
        1019 => "GPS ephemeris",
        1020 => "GLONASS ephemeris",
        1033 => "Receiver and antenna descriptors",
        _ => "",
    }
    .to_string()
}

fn summarize<R: Read>(filename: &Path, reader: R) -> Info {
    let registry = Registry::default();
    let mut frames = FrameReader::new(reader);
    let mut summary = Summary::default();
    let mut types: BTreeMap<u16, TypeSummary> = BTreeMap::default();

    for zult in frames.by_ref() {
        let frame = match zult {
            Ok(frame) => frame,
            Err(err) => {
                warn!("read failed: {err}");
                summary.read_errors += 1;
                continue;
            }
        };
        summary.total_frames += 1;
        summary.total_bytes += frame.wire_len();

        let entry = types.entry(frame.type_code).or_insert_with(|| TypeSummary {
            registered: registry.contains(frame.type_code),
            description: describe(frame.type_code),
            ..Default::default()
        });
        entry.count += 1;
        entry.bytes += frame.payload.len();

        match registry.dispatch(&frame) {
            Ok(DecodedMessage::Unknown { .. }) => summary.unknown_messages += 1,
            Ok(_) => (),
            Err(err) => {
                debug!(offset = frame.offset, "{err}");
                summary.decode_errors += 1;
                entry.errors += 1;
            }
        }
    }

    let stats = frames.stats();
    summary.resyncs = stats.resyncs;
    summary.skipped_bytes = stats.skipped;

    Info {
        filename: filename.to_string_lossy().to_string(),
        summary,
        types,
    }
}

pub fn info<R: Read>(filename: &Path, reader: R, format: &Format) -> Result<()> {
    let info = summarize(filename, reader);

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &info).context("serializing to json")
        }
        Format::Text => {
            let data = render_text(&info).context("serializing info")?;
            stdout()
                .write_all(data.as_bytes())
                .context("writing to stdout")
        }
    }
}

fn render_text(info: &Info) -> Result<String> {
    handlebars_helper!(left_pad: |num: u64, v: Json| {
        let v = match v {
            serde_json::Value::String(s) => s.to_owned(),
            serde_json::Value::Null => String::new(),
            _ => v.to_string()
        };
        let width = usize::try_from(num).unwrap_or(0).max(v.len());
        format!("{v:>width$}")
    });
    let mut hb = handlebars::Handlebars::new();
    hb.register_helper("lpad", Box::new(left_pad));
    hb.register_template_string("info", TEXT_TEMPLATE)
        .context("registering template")?;

    hb.render("info", &info).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"{{ filename }}
===============================================================================
Frames:   {{ summary.total_frames }} ({{ summary.total_bytes }} bytes)
Resyncs:  {{ summary.resyncs }}
Skipped:  {{ summary.skipped_bytes }} bytes
Errors:   {{ summary.decode_errors }} decode, {{ summary.read_errors }} read
Unknown:  {{ summary.unknown_messages }}
-------------------------------------------------------------------------------
 Type    Count   Errors      Bytes  Description
-------------------------------------------------------------------------------
{{ #each types }}{{ lpad 5 @key }}  {{ lpad 7 count }}  {{ lpad 7 errors }}  {{ lpad 9 bytes }}  {{ description }}{{ #unless registered }} (not decoded){{ /unless }}
{{/each }}
";
