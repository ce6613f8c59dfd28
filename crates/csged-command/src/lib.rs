//! Rule-based natural-language commands.
//!
//! One input line in, one structured command out. The pipeline is a single
//! pass: normalize, tokenize on whitespace, match the first token against a
//! fixed verb vocabulary, find the first shape word anywhere in the line,
//! then scan left to right for parameter keywords.
//!
//! Parameter extraction is deliberately permissive: a number that fails to
//! parse becomes its default (0 for positions) instead of failing the whole
//! line. Only a missing verb or a missing shape rejects the input.
//!
//! ```
//! use csged_command::{parse, ParsedCommand};
//! use csged_ir::Primitive;
//!
//! match parse("add box at 1 2 3").unwrap() {
//!     ParsedCommand::Create { primitive, position } => {
//!         assert!(matches!(primitive, Primitive::Box { .. }));
//!         assert_eq!(position, [1.0, 2.0, 3.0]);
//!     }
//!     _ => unreachable!(),
//! }
//! ```

use csged_ir::{BoolOp, Primitive};
use thiserror::Error;

const CREATE_VERBS: &[&str] = &["add", "create", "make", "new"];
const SUBTRACT_VERBS: &[&str] = &["subtract", "cut", "remove"];
const UNION_VERBS: &[&str] = &["union", "combine"];
const INTERSECT_VERBS: &[&str] = &["intersect"];

const BOX_WORDS: &[&str] = &["box", "cube", "square"];
const SPHERE_WORDS: &[&str] = &["sphere", "ball", "circle"];

const SIZE_KEYWORDS: &[&str] = &["size", "width", "height", "depth"];
const RADIUS_KEYWORDS: &[&str] = &["radius", "r"];
const POSITION_KEYWORDS: &[&str] = &["at", "position", "pos", "loc"];

/// A successfully parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCommand {
    /// Create a new primitive.
    Create {
        /// The primitive with its parsed (or default) parameters.
        primitive: Primitive,
        /// Parsed (or default) placement.
        position: [f64; 3],
    },
    /// Combine the current selection with a new primitive.
    Boolean {
        /// The boolean operator the verb mapped to.
        op: BoolOp,
        /// The new right-operand primitive.
        primitive: Primitive,
        /// Placement of the new primitive.
        position: [f64; 3],
    },
}

/// Why a command line was rejected. A failed parse never touches the
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line held no tokens at all.
    #[error("input empty")]
    EmptyInput,
    /// The first token matched no verb vocabulary.
    #[error("unrecognized verb {0:?} (try add, subtract, union, intersect)")]
    UnrecognizedVerb(String),
    /// No token matched the box or sphere vocabulary.
    #[error("no shape found (expected box or sphere)")]
    NoShape,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Shape {
    Box,
    Sphere,
}

enum Intent {
    Create,
    Boolean(BoolOp),
}

/// Parse one line of free text into a [`ParsedCommand`].
pub fn parse(input: &str) -> Result<ParsedCommand, ParseError> {
    // Lowercase, trim, collapse whitespace runs: all in one tokenize step.
    let normalized = input.to_lowercase();
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    let Some(&verb) = tokens.first() else {
        return Err(ParseError::EmptyInput);
    };

    let intent = if CREATE_VERBS.contains(&verb) {
        Intent::Create
    } else if SUBTRACT_VERBS.contains(&verb) {
        Intent::Boolean(BoolOp::Subtract)
    } else if UNION_VERBS.contains(&verb) {
        Intent::Boolean(BoolOp::Union)
    } else if INTERSECT_VERBS.contains(&verb) {
        Intent::Boolean(BoolOp::Intersect)
    } else {
        return Err(ParseError::UnrecognizedVerb(verb.to_string()));
    };

    // First shape word anywhere in the stream wins.
    let shape = tokens
        .iter()
        .find_map(|t| {
            if BOX_WORDS.contains(t) {
                Some(Shape::Box)
            } else if SPHERE_WORDS.contains(t) {
                Some(Shape::Sphere)
            } else {
                None
            }
        })
        .ok_or(ParseError::NoShape)?;

    let (primitive, position) = extract_params(&tokens, shape);

    Ok(match intent {
        Intent::Create => ParsedCommand::Create {
            primitive,
            position,
        },
        Intent::Boolean(op) => ParsedCommand::Boolean {
            op,
            primitive,
            position,
        },
    })
}

fn float(token: Option<&&str>) -> Option<f64> {
    token.and_then(|t| t.parse().ok())
}

fn float_or(token: &str, default: f64) -> f64 {
    token.parse().unwrap_or(default)
}

/// One shared left-to-right scan: a keyword consumes its number tokens, so
/// a consumed token is never re-read as another keyword.
fn extract_params(tokens: &[&str], shape: Shape) -> (Primitive, [f64; 3]) {
    let mut position = [0.0; 3];
    let (mut width, mut height, mut depth) = (1.0, 1.0, 1.0);
    let mut radius = 1.0;

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];

        // Position: `at x y z`. Unparseable numbers become 0 rather than
        // aborting the scan.
        if POSITION_KEYWORDS.contains(&token) && i + 3 < tokens.len() {
            position[0] = float_or(tokens[i + 1], 0.0);
            position[1] = float_or(tokens[i + 2], 0.0);
            position[2] = float_or(tokens[i + 3], 0.0);
            i += 3;
        } else if shape == Shape::Sphere
            && RADIUS_KEYWORDS.contains(&token)
            && i + 1 < tokens.len()
        {
            radius = float_or(tokens[i + 1], 1.0);
            i += 1;
        } else if shape == Shape::Box && SIZE_KEYWORDS.contains(&token) {
            // Three numbers, or exactly one for a uniform cube edge.
            let n1 = float(tokens.get(i + 1));
            let n2 = float(tokens.get(i + 2));
            let n3 = float(tokens.get(i + 3));
            match (n1, n2, n3) {
                (Some(w), Some(h), Some(d)) => {
                    width = w;
                    height = h;
                    depth = d;
                    i += 3;
                }
                (Some(edge), _, _) => {
                    width = edge;
                    height = edge;
                    depth = edge;
                    i += 1;
                }
                _ => {}
            }
        }
        i += 1;
    }

    let primitive = match shape {
        Shape::Box => Primitive::Box {
            width,
            height,
            depth,
        },
        Shape::Sphere => Primitive::Sphere { radius },
    };
    (primitive, position)
}
