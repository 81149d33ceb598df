//! Parsers for whitespace-delimited yield tables.
//!
//! Lines beginning with `#` are comments except where a header is
//! expected; blank lines are skipped everywhere.

use indexmap::IndexMap;

use gce_core::Element;

use crate::agb::AgbGrid;
use crate::error::YieldError;
use crate::snia::SniaModel;
use crate::table::MassYieldTable;

/// Non-empty lines with their 1-based numbers.
fn lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty())
}

fn numbers(line_no: usize, line: &str) -> Result<Vec<f64>, YieldError> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<f64>()
                .map_err(|_| YieldError::parse(line_no, format!("not a number: '{tok}'")))
        })
        .collect()
}

/// Element an isotope label belongs to, e.g. `"fe56"` → `Fe`.
fn isotope_element(line_no: usize, label: &str) -> Result<Element, YieldError> {
    let symbol: String = label.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    symbol
        .parse::<Element>()
        .map_err(|_| YieldError::parse(line_no, format!("unrecognized isotope '{label}'")))
}

/// Parse a CCSN table for `element`.
///
/// The first non-empty line must be a header `# M_init <isotopes...>`;
/// every following row holds a progenitor mass and one yield per
/// isotope. Isotope yields are summed into the element yield.
pub fn parse_mass_yield_table(text: &str, element: Element) -> Result<MassYieldTable, YieldError> {
    let mut it = lines(text);
    let (header_no, header) = it
        .next()
        .ok_or_else(|| YieldError::parse(1, "empty table"))?;
    let labels: Vec<&str> = header
        .strip_prefix('#')
        .ok_or_else(|| YieldError::parse(header_no, "expected '# M_init <isotopes>' header"))?
        .split_whitespace()
        .collect();
    if labels.len() < 2 || !labels[0].eq_ignore_ascii_case("m_init") {
        return Err(YieldError::parse(
            header_no,
            "expected '# M_init <isotopes>' header",
        ));
    }
    for label in &labels[1..] {
        let e = isotope_element(header_no, label)?;
        if e != element {
            return Err(YieldError::parse(
                header_no,
                format!("isotope '{label}' does not belong to {element}"),
            ));
        }
    }
    let mut masses = Vec::new();
    let mut yields = Vec::new();
    for (no, line) in it {
        if line.starts_with('#') {
            continue;
        }
        let row = numbers(no, line)?;
        if row.len() != labels.len() {
            return Err(YieldError::parse(
                no,
                format!("expected {} columns, got {}", labels.len(), row.len()),
            ));
        }
        masses.push(row[0]);
        yields.push(row[1..].iter().sum());
    }
    Ok(MassYieldTable::new(element, masses, yields)?)
}

/// Parse an AGB table of `initial_mass metallicity net_yield` rows.
pub fn parse_agb_table(text: &str) -> Result<AgbGrid, YieldError> {
    let mut triples = Vec::new();
    for (no, line) in lines(text) {
        if line.starts_with('#') {
            continue;
        }
        let row = numbers(no, line)?;
        if row.len() != 3 {
            return Err(YieldError::parse(
                no,
                format!("expected 3 columns, got {}", row.len()),
            ));
        }
        triples.push((row[0], row[1], row[2]));
    }
    Ok(AgbGrid::from_triples(&triples)?)
}

/// Parse an SN Ia model of `isotope mass` rows, summed per element.
///
/// Isotopes of untracked or unknown elements are rejected so that a
/// typo never silently drops mass.
pub fn parse_snia_table(name: &str, text: &str) -> Result<SniaModel, YieldError> {
    let mut yields: IndexMap<Element, f64> = IndexMap::new();
    for (no, line) in lines(text) {
        if line.starts_with('#') {
            continue;
        }
        let mut toks = line.split_whitespace();
        let (Some(label), Some(mass), None) = (toks.next(), toks.next(), toks.next()) else {
            return Err(YieldError::parse(no, "expected 'isotope mass'"));
        };
        let element = isotope_element(no, label)?;
        let mass: f64 = mass
            .parse()
            .map_err(|_| YieldError::parse(no, format!("not a number: '{mass}'")))?;
        *yields.entry(element).or_insert(0.0) += mass;
    }
    Ok(SniaModel::new(name, yields)?)
}
