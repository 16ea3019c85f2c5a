//! export::csv
//!
//! Option catalog export.
//!
//! One row per option in document order, followed by one row per schedule
//! option, under the header
//! `modelicaPath,name,type,group,options`. Every cell is written as a JSON
//! string literal, so embedded commas and quotes survive. `type` keeps only
//! the last path segment of the raw type, and `options` is a JSON array of
//! the last path segment of each child reference, encoded again as a cell.
//! Child references are exported as declared, including ones that do not
//! resolve to a catalog entry.

use serde::{Deserialize, Serialize};

use crate::core::catalog::{Catalog, OptionNode};
use crate::core::types::last_segment;

/// Column names, in output order.
pub const HEADER: [&str; 5] = ["modelicaPath", "name", "type", "group", "options"];

/// Row separator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Crlf,
    Lf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

impl std::fmt::Display for LineEnding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineEnding::Crlf => write!(f, "crlf"),
            LineEnding::Lf => write!(f, "lf"),
        }
    }
}

impl std::str::FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crlf" => Ok(LineEnding::Crlf),
            "lf" => Ok(LineEnding::Lf),
            other => Err(format!("unknown line ending '{other}', expected 'crlf' or 'lf'")),
        }
    }
}

/// Render the catalog's options as CSV.
///
/// There is no trailing newline after the last row.
pub fn options_csv(catalog: &Catalog, line_ending: LineEnding) -> String {
    let nodes = catalog.options().iter().chain(catalog.schedule_options());
    let mut rows = Vec::with_capacity(catalog.options().len() + catalog.schedule_options().len() + 1);
    rows.push(HEADER.join(","));
    rows.extend(nodes.map(option_row));
    rows.join(line_ending.as_str())
}

fn option_row(node: &OptionNode) -> String {
    let children: Vec<&str> = node
        .child_paths
        .iter()
        .map(|path| path.last_segment())
        .collect();
    let options = serde_json::Value::from(children).to_string();

    [
        node.path.as_str(),
        node.name.as_str(),
        last_segment(&node.type_name),
        node.group.as_deref().unwrap_or(""),
        options.as_str(),
    ]
    .iter()
    .map(|cell| encode_cell(cell))
    .collect::<Vec<_>>()
    .join(",")
}

fn encode_cell(cell: &str) -> String {
    serde_json::Value::from(cell).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "options": [
            {
                "modelicaPath": "Buildings.Templates.AirHandlersFans.VAVMultiZone.fan",
                "name": "Supply fan",
                "type": "Buildings.Templates.Components.Fans.Interfaces.PartialFan",
                "group": "Fans",
                "options": [
                    "Buildings.Templates.Components.Fans.SingleVariable",
                    "Buildings.Templates.Components.Fans.None"
                ]
            },
            {
                "modelicaPath": "Buildings.Templates.Components.Fans.SingleVariable",
                "name": "Single fan, \"variable\" speed",
                "type": "final"
            }
        ]
    }"#;

    #[test]
    fn header_and_rows() {
        let catalog = Catalog::load(CATALOG).unwrap();
        let csv = options_csv(&catalog, LineEnding::Crlf);
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "modelicaPath,name,type,group,options");
        assert_eq!(
            lines[1],
            r#""Buildings.Templates.AirHandlersFans.VAVMultiZone.fan","Supply fan","PartialFan","Fans","[\"SingleVariable\",\"None\"]""#
        );
    }

    #[test]
    fn missing_group_and_children_are_empty() {
        let catalog = Catalog::load(CATALOG).unwrap();
        let csv = options_csv(&catalog, LineEnding::Crlf);
        let last = csv.split("\r\n").last().unwrap();

        assert_eq!(
            last,
            r#""Buildings.Templates.Components.Fans.SingleVariable","Single fan, \"variable\" speed","final","","[]""#
        );
    }

    #[test]
    fn no_trailing_line_ending() {
        let catalog = Catalog::load(CATALOG).unwrap();
        assert!(!options_csv(&catalog, LineEnding::Crlf).ends_with("\r\n"));
    }

    #[test]
    fn lf_line_endings() {
        let catalog = Catalog::load(CATALOG).unwrap();
        let csv = options_csv(&catalog, LineEnding::Lf);
        assert!(!csv.contains('\r'));
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn empty_catalog_is_header_only() {
        let catalog = Catalog::load("{}").unwrap();
        assert_eq!(
            options_csv(&catalog, LineEnding::Crlf),
            "modelicaPath,name,type,group,options"
        );
    }

    #[test]
    fn line_ending_parses() {
        assert_eq!("lf".parse::<LineEnding>().unwrap(), LineEnding::Lf);
        assert!("cr".parse::<LineEnding>().is_err());
    }

    #[test]
    fn schedule_options_follow_regular_options() {
        let catalog = Catalog::load(
            r#"{
                "scheduleOptions": [{ "modelicaPath": "T.dat", "name": "Data", "type": "Buildings.Templates.Data" }],
                "options": [
                    { "modelicaPath": "T", "name": "T", "type": "dropdown", "options": ["T.fan"] },
                    { "modelicaPath": "T.fan", "name": "Fan", "type": "Boolean" }
                ]
            }"#,
        )
        .unwrap();
        let csv = options_csv(&catalog, LineEnding::Lf);
        let paths: Vec<&str> = csv
            .lines()
            .skip(1)
            .map(|line| line.split(',').next().unwrap())
            .collect();

        assert_eq!(paths, vec![r#""T""#, r#""T.fan""#, r#""T.dat""#]);
        assert!(csv.ends_with(r#""T.dat","Data","Data","","[]""#));
    }
}
