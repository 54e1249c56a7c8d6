//! XML payload parsing for the public game API.
//!
//! Two documents are understood:
//!
//! ```text
//! <players>
//!   <player id="100001" name="alice" status="a" alliance="500"/>
//! </players>
//!
//! <playerData id="100001" name="alice" serverId="en166" timestamp="1700000000">
//!   <positions>
//!     <position type="0" score="1523">42</position>
//!     <position type="3" score="120" ships="35">7</position>
//!   </positions>
//!   <planets><planet id="1" name="Home" coords="1:2:3"/></planets>
//!   <alliance id="500"><name>Foo</name><tag>F</tag></alliance>
//! </playerData>
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use rostersync_sync::{SyncError, SyncResult};
use rostersync_types::{DetailRecord, Entity, Position, ScoreCategory};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// Parses a `players.xml` document into roster entries, in document order.
pub fn parse_roster(xml: &str) -> SyncResult<Vec<Entity>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut saw_root = false;
    let mut entities = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"players" => saw_root = true,
                b"player" => {
                    let id = required(e, "id", "player")?;
                    let name = required(e, "name", "player")?;
                    entities.push(Entity::new(id, name));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(protocol("players.xml", e)),
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(SyncError::Protocol(
            "players.xml: missing <players> element".into(),
        ));
    }
    Ok(entities)
}

/// Parses a `playerData.xml` document into a detail record.
///
/// Positions with a type code this build does not know are skipped.
pub fn parse_detail(xml: &str) -> SyncResult<DetailRecord> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut detail = DetailBuilder::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => detail.element(e, false)?,
            Ok(Event::Empty(ref e)) => detail.element(e, true)?,
            Ok(Event::Text(ref t)) => {
                if detail.open_position.is_some() {
                    let text = t.unescape().map_err(|e| protocol("playerData.xml", e))?;
                    detail.rank(text.trim())?;
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"position" => detail.close_position(),
            Ok(Event::Eof) => break,
            Err(e) => return Err(protocol("playerData.xml", e)),
            _ => {}
        }
        buf.clear();
    }

    detail.record.ok_or_else(|| {
        SyncError::Protocol("playerData.xml: missing <playerData> element".into())
    })
}

#[derive(Default)]
struct DetailBuilder {
    record: Option<DetailRecord>,
    open_position: Option<Position>,
    saw_alliance: bool,
}

impl DetailBuilder {
    fn element(&mut self, e: &BytesStart<'_>, empty: bool) -> SyncResult<()> {
        match e.name().as_ref() {
            b"playerData" => {
                let timestamp = match optional(e, "timestamp")? {
                    Some(raw) => number(&raw, "timestamp")?,
                    None => 0,
                };
                self.record = Some(DetailRecord {
                    id: required(e, "id", "playerData")?,
                    username: required(e, "name", "playerData")?,
                    server_id: optional(e, "serverId")?,
                    timestamp,
                    ..Default::default()
                });
            }
            b"position" => {
                let position = parse_position(e)?;
                let record = self.record_mut("position")?;
                match position {
                    // Self-closing positions carry no rank.
                    Some(position) if empty => record.positions.push(position),
                    Some(position) => self.open_position = Some(position),
                    None => {}
                }
            }
            b"planet" => self.record_mut("planet")?.planet_count += 1,
            b"alliance" if !self.saw_alliance => {
                self.saw_alliance = true;
                let alliance_id = optional(e, "id")?.filter(|id| !id.is_empty());
                self.record_mut("alliance")?.alliance_id = alliance_id;
            }
            _ => {}
        }
        Ok(())
    }

    fn rank(&mut self, text: &str) -> SyncResult<()> {
        if let Some(position) = self.open_position.as_mut() {
            position.ranking = number(text, "position rank")?;
        }
        Ok(())
    }

    fn close_position(&mut self) {
        if let (Some(position), Some(record)) = (self.open_position.take(), self.record.as_mut()) {
            record.positions.push(position);
        }
    }

    fn record_mut(&mut self, element: &str) -> SyncResult<&mut DetailRecord> {
        self.record.as_mut().ok_or_else(|| {
            SyncError::Protocol(format!(
                "playerData.xml: <{element}> outside <playerData>"
            ))
        })
    }
}

fn parse_position(e: &BytesStart<'_>) -> SyncResult<Option<Position>> {
    let code: u8 = number(&required(e, "type", "position")?, "position type")?;
    let Ok(category) = ScoreCategory::try_from(code) else {
        debug!("Skipping position with unknown type {}", code);
        return Ok(None);
    };
    let score = number(&required(e, "score", "position")?, "position score")?;
    let ships = match optional(e, "ships")? {
        Some(raw) => Some(number(&raw, "position ships")?),
        None => None,
    };
    Ok(Some(Position {
        category,
        score,
        ranking: 0,
        ships,
    }))
}

fn optional(e: &BytesStart<'_>, name: &str) -> SyncResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| protocol("attribute", err))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|err| protocol("attribute", err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required(e: &BytesStart<'_>, name: &str, element: &str) -> SyncResult<String> {
    optional(e, name)?.ok_or_else(|| {
        SyncError::Protocol(format!("<{element}> is missing the `{name}` attribute"))
    })
}

fn number<T>(raw: &str, what: &str) -> SyncResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| SyncError::Protocol(format!("invalid {what} {raw:?}: {e}")))
}

fn protocol(context: &str, err: impl Display) -> SyncError {
    SyncError::Protocol(format!("{context}: {err}"))
}
