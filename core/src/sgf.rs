// SPDX-License-Identifier: MIT OR Apache-2.0

//! SGF (Smart Game Format) export and import of the main line

use crate::scoring::{format_margin, GameResult};
use crate::{Color, Coord, Move};
use anyhow::{anyhow, Context, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Builds the SGF text for a single main line
pub struct SgfWriter {
    sgf: String,
}

impl SgfWriter {
    /// Start a game record with the root properties
    pub fn new(size: u8, komi: Option<f32>) -> Self {
        let mut sgf = format!("(;GM[1]FF[4]SZ[{}]", size);
        if let Some(komi) = komi {
            sgf.push_str(&format!("KM[{}]", format_komi(komi)));
        }
        Self { sgf }
    }

    /// Append one move node
    pub fn add_move(&mut self, mv: &Move) {
        let tag = mv.color.letter();
        match mv.point {
            Some(coord) => self
                .sgf
                .push_str(&format!(";{}[{}]", tag, coord_to_sgf(coord))),
            None => self.sgf.push_str(&format!(";{}[]", tag)),
        }
    }

    /// Close the game tree, appending the result node if there is one
    pub fn finish(mut self, result: Option<GameResult>) -> String {
        if let Some(result) = result {
            self.sgf.push_str(&format!(";RE[{}]", result));
        }
        self.sgf.push(')');
        self.sgf
    }
}

/// Komi as written in `KM`: integral values without decimals
pub fn format_komi(komi: f32) -> String {
    if komi.fract() == 0.0 {
        format_margin(komi)
    } else {
        komi.to_string()
    }
}

fn coord_to_sgf(coord: Coord) -> String {
    let x = (b'a' + coord.x) as char;
    let y = (b'a' + coord.y) as char;
    format!("{}{}", x, y)
}

/// Main line of an SGF game
#[derive(Debug, Clone, PartialEq)]
pub struct SgfGame {
    pub size: u8,
    pub komi: Option<f32>,
    pub moves: Vec<Move>,
    pub result: Option<GameResult>,
    /// Main line places or clears stones with `AB`, `AW` or `AE`
    pub has_setup: bool,
}

/// Represents an SGF property
#[derive(Debug, Clone)]
struct SgfProperty {
    id: String,
    values: Vec<String>,
}

/// Represents an SGF node
#[derive(Debug, Clone)]
struct SgfNode {
    properties: Vec<SgfProperty>,
}

/// Open game tree while scanning
struct TreeFrame {
    main_line: bool,
    variations: usize,
}

/// Parse SGF text and extract the main line (first variation at each fork).
///
/// Nesting is tracked on a heap stack, so deep variation trees cannot
/// exhaust the call stack.
pub fn parse_game(sgf_text: &str) -> Result<SgfGame> {
    let mut chars = sgf_text.chars().peekable();
    let mut game = SgfGame {
        size: 19,
        komi: None,
        moves: Vec::new(),
        result: None,
        has_setup: false,
    };

    skip_whitespace(&mut chars);
    if chars.next() != Some('(') {
        return Err(anyhow!("Expected '(' at start of game tree"));
    }
    let mut open = vec![TreeFrame {
        main_line: true,
        variations: 0,
    }];

    while let Some(frame) = open.last_mut() {
        skip_whitespace(&mut chars);
        match chars.next() {
            Some(';') => {
                if frame.variations > 0 {
                    return Err(anyhow!("Node follows the variations of its game tree"));
                }
                let node = parse_node(&mut chars)?;
                if frame.main_line {
                    apply_node(&node, &mut game)?;
                }
            }
            Some('(') => {
                let main_line = frame.main_line && frame.variations == 0;
                frame.variations += 1;
                open.push(TreeFrame {
                    main_line,
                    variations: 0,
                });
            }
            Some(')') => {
                open.pop();
            }
            Some(c) => return Err(anyhow!("Unexpected '{}' in game tree", c)),
            None => return Err(anyhow!("Expected ')' at end of game tree")),
        }
    }

    Ok(game)
}

fn apply_node(node: &SgfNode, game: &mut SgfGame) -> Result<()> {
    for prop in &node.properties {
        let value = prop.values.first().map(String::as_str).unwrap_or("");
        match prop.id.as_str() {
            "SZ" => {
                game.size = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid board size: {}", value))?;
            }
            "KM" => {
                let komi = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid komi: {}", value))?;
                game.komi = Some(komi);
            }
            "RE" => game.result = value.parse().ok(),
            "AB" | "AW" | "AE" => game.has_setup = true,
            "B" | "W" => {
                let color = if prop.id == "B" {
                    Color::Black
                } else {
                    Color::White
                };
                let point = parse_sgf_coord(value, game.size)?;
                game.moves.push(Move { color, point });
            }
            _ => (),
        }
    }
    Ok(())
}

/// Parse an SGF coordinate like "ab". Empty (or "tt" on small boards) is a pass.
fn parse_sgf_coord(sgf_coord: &str, board_size: u8) -> Result<Option<Coord>> {
    if sgf_coord.is_empty() || (sgf_coord == "tt" && board_size <= 19) {
        return Ok(None);
    }

    let bytes = sgf_coord.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_lowercase) {
        return Err(anyhow!("Invalid SGF coordinate: {}", sgf_coord));
    }

    let coord = Coord::new(bytes[0] - b'a', bytes[1] - b'a');
    if !coord.is_valid(board_size) {
        return Err(anyhow!("SGF coordinate out of board bounds: {}", sgf_coord));
    }
    Ok(Some(coord))
}

/// Properties of one node; the leading ';' is already consumed
fn parse_node(chars: &mut Peekable<Chars>) -> Result<SgfNode> {
    let mut properties = Vec::new();
    skip_whitespace(chars);
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_uppercase() {
            break;
        }
        properties.push(parse_property(chars)?);
        skip_whitespace(chars);
    }

    Ok(SgfNode { properties })
}

fn parse_property(chars: &mut Peekable<Chars>) -> Result<SgfProperty> {
    let mut id = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_uppercase) {
        id.push(c);
    }

    skip_whitespace(chars);
    let mut values = Vec::new();
    while chars.peek() == Some(&'[') {
        values.push(parse_property_value(chars)?);
        skip_whitespace(chars);
    }
    if values.is_empty() {
        return Err(anyhow!("Property {} has no value", id));
    }

    Ok(SgfProperty { id, values })
}

fn parse_property_value(chars: &mut Peekable<Chars>) -> Result<String> {
    if chars.next() != Some('[') {
        return Err(anyhow!("Expected '[' at start of property value"));
    }

    let mut value = String::new();
    loop {
        match chars.next() {
            Some('\\') => {
                if let Some(escaped) = chars.next() {
                    value.push(escaped);
                }
            }
            Some(']') => return Ok(value),
            Some(c) => value.push(c),
            None => return Err(anyhow!("Unterminated property value")),
        }
    }
}

fn skip_whitespace(chars: &mut Peekable<Chars>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}
