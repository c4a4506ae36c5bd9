//! Manifest and position file parsing
//!
//! The manifest (`<graph-id>.gr`) is the graph's textual form: the display
//! name on the first line, then one line per node holding the node id and
//! its out-links, comma separated. The `position` file holds `x,y`.

use chumsky::prelude::*;
use tracing::trace;

use crate::core::NodeId;

/// One node line of a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRow {
    pub id: NodeId,
    pub links: Vec<NodeId>,
}

/// Parsed manifest contents, rows in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub rows: Vec<ManifestRow>,
}

impl Manifest {
    /// Parse manifest text
    ///
    /// Blank lines after the name are ignored. A node id may head at most
    /// one row.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut lines = text.lines();
        let name = match lines.next() {
            Some(line) if !line.trim().is_empty() => line.to_string(),
            _ => return Err("missing graph name on first line".to_string()),
        };

        let parser = row_parser();
        let mut rows: Vec<ManifestRow> = Vec::new();
        for (index, line) in lines.enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let line_no = index + 2;
            let fields = parser
                .parse(line)
                .into_result()
                .map_err(|_| format!("line {}: expected comma-separated identifiers", line_no))?;
            let mut ids = fields.into_iter().map(|field| {
                field
                    .parse::<NodeId>()
                    .map_err(|e| format!("line {}: bad node identifier '{}': {}", line_no, field, e))
            });
            let id = match ids.next() {
                Some(id) => id?,
                None => return Err(format!("line {}: empty row", line_no)),
            };
            let links = ids.collect::<Result<Vec<_>, _>>()?;
            if rows.iter().any(|row| row.id == id) {
                return Err(format!("line {}: node {} listed twice", line_no, id));
            }
            trace!(node_id = %id, link_count = links.len(), "Parsed manifest row");
            rows.push(ManifestRow { id, links });
        }

        Ok(Self { name, rows })
    }
}

/// `field(,field)*` where a field is any run of characters but commas
fn row_parser<'src>() -> impl Parser<'src, &'src str, Vec<&'src str>> + Clone {
    none_of(", \t")
        .repeated()
        .at_least(1)
        .to_slice()
        .separated_by(just(',').padded_by(one_of(" \t").repeated()))
        .at_least(1)
        .collect::<Vec<&str>>()
        .then_ignore(end())
}

/// `-?digits,-?digits`
fn position_parser<'src>() -> impl Parser<'src, &'src str, (&'src str, &'src str)> + Clone {
    let int = just('-')
        .or_not()
        .then(one_of('0'..='9').repeated().at_least(1))
        .to_slice();
    int.clone()
        .then_ignore(just(','))
        .then(int)
        .then_ignore(end())
}

/// Parse the contents of a `position` file
pub fn parse_position(text: &str) -> Result<(i32, i32), String> {
    let line = text.lines().next().unwrap_or("").trim();
    let (x, y) = position_parser()
        .parse(line)
        .into_result()
        .map_err(|_| format!("expected 'x,y', found '{}'", line))?;
    let coordinate = |s: &str| {
        s.parse::<i32>()
            .map_err(|e| format!("coordinate '{}' out of range: {}", s, e))
    };
    Ok((coordinate(x)?, coordinate(y)?))
}
