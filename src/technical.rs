//! Technical metadata block for child records.
//!
//! Unlike the rest of a record, this block is built as a small element tree and
//! serialized with `quick-xml`, because its shape depends on the media type and
//! on which optional facts a row supplies.
//!
//! ```text
//! <technical>
//!   <fileName>..</fileName>
//!   <format><mimeType>..</mimeType><compression>lossy</compression></format>
//!   <audio|video>
//!     <duration>..</duration>
//!     ...media-specific facts...
//!   </audio|video>
//! </technical>
//! ```

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::MediaType;
use crate::duration::RunTime;
use crate::error::{FoxmlError, Result};
use crate::escape::escape_field;
use crate::row::Row;

#[derive(Debug, Default)]
struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    fn new(name: &'static str) -> Self {
        Element {
            name,
            ..Default::default()
        }
    }

    fn text(name: &'static str, text: &str) -> Self {
        Element {
            name,
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    fn with_attribute(mut self, name: &'static str, value: &str) -> Self {
        self.attributes.push((name, value.to_string()));
        self
    }

    fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name);
        for (name, value) in &self.attributes {
            start.push_attribute((*name, value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::from_escaped(escape_field(text))))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name)))?;
        Ok(())
    }
}

/// Build the technical metadata block for one child row.
///
/// `duration` is the child's converted run time; `None` leaves the duration
/// element empty.
///
/// # Errors
///
/// Returns [`FoxmlError::MissingField`] when `FileName` (or `TrackFormat` for
/// audio) is absent, and [`FoxmlError::MalformedField`] for a `DataRate` without
/// a rate unit.
pub fn technical_metadata(row: &Row, media: MediaType, duration: Option<RunTime>) -> Result<String> {
    let mut root = Element::new("technical");
    root.push(Element::text("fileName", row.get("FileName")?));

    let mut format = Element::new("format");
    format.push(Element::text("mimeType", media.mime_type()));
    format.push(Element::text("compression", "lossy"));
    root.push(format);

    let mut block = Element::new(media.as_str());
    let duration_text = duration.map(|d| d.to_string()).unwrap_or_default();
    block.push(Element::text("duration", &duration_text));

    let mut sound = match media {
        MediaType::Audio => {
            block.push(Element::text("channels", row.get("TrackFormat")?));
            Element::new("audioTrack")
        },
        MediaType::Video => Element::new("videoSound"),
    };
    if let Some(field) = row.get_opt("Mono/Stereo") {
        sound.push(Element::text("soundField", field));
    }
    if let Some(language) = row.get_opt("Language") {
        sound.push(Element::text("language", language));
    }
    block.push(sound);

    if media == MediaType::Video {
        push_video_facts(row, &mut block)?;
    }
    root.push(block);

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    root.write(&mut writer)?;
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn push_video_facts(row: &Row, video: &mut Element) -> Result<()> {
    if let Some(color) = row.get_opt("Color") {
        video.push(Element::text("color", color));
    }

    if let Some(data_rate) = row.get_opt("DataRate") {
        let mut parts = data_rate.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some(value), Some(rate)) => {
                video.push(Element::text("dataRate", value).with_attribute("rate", rate));
            },
            _ => {
                return Err(FoxmlError::MalformedField {
                    line: row.line(),
                    field: "DataRate".to_string(),
                    value: data_rate.to_string(),
                    reason: "expected a value followed by a rate unit".to_string(),
                });
            },
        }
    }

    if let Some(frame_rate) = row.get_opt("FrameRate") {
        video.push(Element::text("frame", frame_rate).with_attribute("rate", "second"));
    }

    let scan_signal = row.get_opt("ScanSignal");
    let video_standard = row.get_opt("VideoStandard");
    if scan_signal.is_some() || video_standard.is_some() {
        let mut video_format = Element::new("videoFormat");
        if let Some(scan) = scan_signal {
            video_format.push(Element::text("scanSignal", scan));
        }
        if let Some(standard) = video_standard {
            video_format.push(Element::text("videoStandard", standard));
        }
        video.push(video_format);
    }

    if let (Some(aspect), Some(horizontal), Some(vertical)) = (
        row.get_opt("AspectRatio"),
        row.get_opt("HorizontalPixels"),
        row.get_opt("VerticalPixels"),
    ) {
        let mut resolution = Element::new("videoResolution");
        resolution.push(Element::text("aspectRatio", aspect));
        resolution.push(Element::text("horizontalPixels", horizontal));
        resolution.push(Element::text("verticalPixels", vertical));
        video.push(resolution);
    }

    Ok(())
}
