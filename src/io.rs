use crate::{CellId, Hypergraph};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line {line}: could not parse {what}")]
    InvalidNumber { line: usize, what: &'static str },
    #[error("line {line}: missing {what}")]
    Missing { line: usize, what: &'static str },
    #[error("unexpected end of input inside net {net}")]
    UnexpectedEof { net: String },
    #[error("line {line}: expected `Cell <name>` in net {net}")]
    BadNetMember { line: usize, net: String },
    #[error("line {line}: cell {cell} used in net {net} but never declared")]
    UndefinedCell {
        line: usize,
        cell: String,
        net: String,
    },
}

const GROUP_LABELS: [&str; 4] = ["GroupA", "GroupB", "GroupC", "GroupD"];

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_number<T: std::str::FromStr>(
    token: Option<&str>,
    line: usize,
    what: &'static str,
) -> Result<T, ParseError> {
    token
        .ok_or(ParseError::Missing { line, what })?
        .parse()
        .map_err(|_| ParseError::InvalidNumber { line, what })
}

impl Hypergraph {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        Self::deserialize(BufReader::new(File::open(path)?))
    }

    /// Reads the `NumCells` / `Cell` / `NumNets` / `Net` text format. Anything after `//`
    /// on a line is ignored.
    pub fn deserialize<R: BufRead>(reader: R) -> Result<Self, ParseError> {
        let mut hg = Hypergraph::new();
        let mut by_name: HashMap<String, CellId> = HashMap::new();
        let mut declared_cells = None;
        let mut declared_nets = None;

        let mut lines = reader.lines().enumerate().map(|(i, l)| (i + 1, l));
        while let Some((line_no, line)) = lines.next() {
            let line = line?;
            let mut tokens = strip_comment(&line).split_ascii_whitespace();
            match tokens.next() {
                Some("NumCells") => {
                    let n: usize = parse_number(tokens.next(), line_no, "cell count")?;
                    hg.cells.reserve(n);
                    declared_cells = Some(n);
                }
                Some("NumNets") => {
                    let n: usize = parse_number(tokens.next(), line_no, "net count")?;
                    hg.nets.reserve(n);
                    declared_nets = Some(n);
                }
                Some("Cell") => {
                    let name = tokens.next().ok_or(ParseError::Missing {
                        line: line_no,
                        what: "cell name",
                    })?;
                    // A bare `Cell <name>` outside a net block carries no size and is skipped.
                    if let Some(size) = tokens.next() {
                        let size = parse_number(Some(size), line_no, "cell size")?;
                        let id = hg.add_cell(name, size);
                        by_name.insert(name.to_string(), id);
                    }
                }
                Some("Net") => {
                    let name = tokens
                        .next()
                        .ok_or(ParseError::Missing {
                            line: line_no,
                            what: "net name",
                        })?
                        .to_string();
                    let degree: usize = parse_number(tokens.next(), line_no, "net degree")?;

                    let mut pins = Vec::with_capacity(degree);
                    while pins.len() < degree {
                        let Some((member_no, member)) = lines.next() else {
                            return Err(ParseError::UnexpectedEof { net: name });
                        };
                        let member = member?;
                        let mut tokens = strip_comment(&member).split_ascii_whitespace();
                        let (keyword, cell) = match (tokens.next(), tokens.next()) {
                            (None, _) => continue,
                            (Some(keyword), cell) => (keyword, cell),
                        };
                        let cell = match (keyword, cell) {
                            ("Cell", Some(cell)) => cell,
                            _ => {
                                return Err(ParseError::BadNetMember {
                                    line: member_no,
                                    net: name,
                                })
                            }
                        };
                        let id = by_name.get(cell).ok_or_else(|| ParseError::UndefinedCell {
                            line: member_no,
                            cell: cell.to_string(),
                            net: name.clone(),
                        })?;
                        pins.push(*id);
                    }
                    let id = hg.add_net(name, pins);
                    let net = &hg.nets[id as usize];
                    if net.degree() != degree {
                        log::warn!(
                            "net {} lists {degree} cells, {} distinct",
                            net.name,
                            net.degree()
                        );
                    }
                }
                _ => {}
            }
        }

        if let Some(n) = declared_cells.filter(|&n| n != hg.cells.len()) {
            log::warn!("NumCells declares {n} cells, found {}", hg.cells.len());
        }
        if let Some(n) = declared_nets.filter(|&n| n != hg.nets.len()) {
            log::warn!("NumNets declares {n} nets, found {}", hg.nets.len());
        }
        log::debug!(
            "read {} cells, {} nets, total size {}, max degree {}",
            hg.cells.len(),
            hg.nets.len(),
            hg.total_size,
            hg.max_degree
        );
        Ok(hg)
    }

    /// Writes the cutsize followed by the sorted cell names of each of the first
    /// `groups` groups.
    pub fn write_partition<W: Write>(&self, mut writer: W, groups: u8) -> io::Result<()> {
        let groups = groups.clamp(1, 4) as usize;
        let mut names: Vec<Vec<&str>> = vec![vec![]; groups];
        for cell in self.cells.iter() {
            let g = (cell.group as usize).min(groups - 1);
            names[g].push(&cell.name);
        }

        writeln!(writer, "CutSize {}", self.recompute_cutsize())?;
        for (g, members) in names.iter_mut().enumerate() {
            members.sort_unstable();
            if g > 0 {
                writeln!(writer)?;
            }
            writeln!(writer, "{} {}", GROUP_LABELS[g], members.len())?;
            for name in members.iter() {
                writeln!(writer, "{name}")?;
            }
        }
        writer.flush()
    }

    pub fn write_partition_to_path<P: AsRef<Path>>(&self, path: P, groups: u8) -> io::Result<()> {
        self.write_partition(io::BufWriter::new(File::create(path)?), groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
NumCells 4 // four cells
Cell a 2
Cell b 1
Cell c 1

Cell d 3
NumNets 2
Net n1 2
Cell a
Cell b
Net n2 3
Cell b
// blank and comment lines inside a net are skipped

Cell c
Cell d
";

    #[test]
    fn reads_cells_and_nets() {
        let hg = Hypergraph::deserialize(SAMPLE.as_bytes()).unwrap();
        assert_eq!(hg.cells.len(), 4);
        assert_eq!(hg.total_size, 7);
        assert_eq!(hg.nets[0].cells, vec![0, 1]);
        assert_eq!(hg.nets[1].cells, vec![1, 2, 3]);
        assert_eq!(hg.nets[1].name, "n2");
        assert_eq!(hg.cells[1].nets, vec![0, 1]);
        assert_eq!(hg.max_degree, 2);
    }

    #[test]
    fn undefined_cell_is_reported() {
        let input = "Cell a 1\nNet n 2\nCell a\nCell zz\n";
        let err = Hypergraph::deserialize(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UndefinedCell { line: 4, ref cell, .. } if cell == "zz"
        ));
    }

    #[test]
    fn truncated_net_is_reported() {
        let input = "Cell a 1\nNet n 2\nCell a\n";
        let err = Hypergraph::deserialize(input.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { ref net } if net == "n"));
    }

    #[test]
    fn repeated_net_member_is_read_once() {
        let input = "Cell a 1\nCell b 1\nCell c 1\nCell d 1\nNet n1 3\nCell a\nCell a\nCell b\nNet n2 2\nCell c\nCell d\n";
        let mut hg = Hypergraph::deserialize(input.as_bytes()).unwrap();
        assert_eq!(hg.nets[0].cells, vec![0, 1]);
        assert_eq!(hg.cells[0].nets, vec![0]);
        assert_eq!(hg.nets[1].cells, vec![2, 3]);

        let report = hg.partition_bisection(&crate::BisectionPartitioningConfig::default());
        assert_eq!(report.final_cutsize, hg.recompute_cutsize());
        assert_eq!(hg.cutsize, hg.recompute_cutsize());
    }

    #[test]
    fn malformed_lines_are_reported() {
        let err = Hypergraph::deserialize("Cell a big\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { line: 1, .. }));

        let err = Hypergraph::deserialize("Cell a 1\nNet n 1\nPin a\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::BadNetMember { line: 3, .. }));

        let err = Hypergraph::deserialize("NumNets\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::Missing { line: 1, .. }));
    }

    #[test]
    fn writes_sorted_groups() {
        let mut hg = Hypergraph::deserialize(SAMPLE.as_bytes()).unwrap();
        hg.cells[0].group = 1;
        hg.cells[3].group = 1;
        let mut out = vec![];
        hg.write_partition(&mut out, 2).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "CutSize 2\nGroupA 2\nb\nc\n\nGroupB 2\na\nd\n"
        );
    }

    #[test]
    fn writes_four_groups() {
        let mut hg = Hypergraph::deserialize(SAMPLE.as_bytes()).unwrap();
        for (i, c) in hg.cells.iter_mut().enumerate() {
            c.group = i as u8;
        }
        let mut out = vec![];
        hg.write_partition(&mut out, 4).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("CutSize 2\nGroupA 1\na\n\nGroupB 1\nb\n"));
        assert!(text.ends_with("GroupD 1\nd\n"));
    }
}
