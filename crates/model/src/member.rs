//! Member identity and descriptor rendering.
//!
//! A `MemberId` names one class member across both snapshots: owning class,
//! member kind, name, and the member's descriptor in the host's native
//! encoding (e.g. `(Ljava/lang/String;)V`). Its `Display` form is the
//! human rendering every report message starts with, so descriptor parsing
//! lives here too.

use std::fmt;

use serde::Serialize;

/// Kind of class member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MemberKind {
    Method,
    Field,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Method => write!(f, "Method"),
            MemberKind::Field => write!(f, "Field"),
        }
    }
}

/// Identity of a class member within a surface snapshot.
///
/// Unique per snapshot. Removal facts carry the v1 descriptor, addition
/// facts the v2 descriptor, and a same-named method whose signature changed
/// is keyed by its v2 descriptor, matching the comparator's convention.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MemberId {
    pub owner: String,
    pub kind: MemberKind,
    pub name: String,
    pub descriptor: String,
}

impl MemberId {
    pub fn method(owner: &str, name: &str, descriptor: &str) -> Self {
        MemberId {
            owner: owner.to_string(),
            kind: MemberKind::Method,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        }
    }

    pub fn field(owner: &str, name: &str, descriptor: &str) -> Self {
        MemberId {
            owner: owner.to_string(),
            kind: MemberKind::Field,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        }
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MemberKind::Method => {
                let params = match parse_method_descriptor(&self.descriptor) {
                    Some(sig) => sig.parameters.join(", "),
                    None => self.descriptor.clone(),
                };
                write!(f, "Method {}.{}({})", self.owner, self.name, params)
            }
            MemberKind::Field => write!(f, "Field {}.{}", self.owner, self.name),
        }
    }
}

/// Parsed form of a method descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub parameters: Vec<String>,
    pub return_type: String,
}

/// Parse a method descriptor like `(Ljava/lang/String;I)V` into source-level
/// type names. Returns `None` on malformed input.
pub fn parse_method_descriptor(descriptor: &str) -> Option<MethodSignature> {
    let rest = descriptor.strip_prefix('(')?;
    let close = rest.find(')')?;
    let (param_part, ret_part) = (&rest[..close], &rest[close + 1..]);

    let mut parameters = Vec::new();
    let mut chars = param_part.chars().peekable();
    while chars.peek().is_some() {
        parameters.push(parse_type(&mut chars)?);
    }

    let mut ret_chars = ret_part.chars().peekable();
    let return_type = parse_type(&mut ret_chars)?;
    if ret_chars.next().is_some() {
        return None;
    }

    Some(MethodSignature {
        parameters,
        return_type,
    })
}

/// Parse one field-type descriptor from the stream.
fn parse_type(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut dimensions = 0usize;
    while chars.peek() == Some(&'[') {
        chars.next();
        dimensions += 1;
    }

    let base = match chars.next()? {
        'Z' => "boolean".to_string(),
        'B' => "byte".to_string(),
        'C' => "char".to_string(),
        'S' => "short".to_string(),
        'I' => "int".to_string(),
        'J' => "long".to_string(),
        'F' => "float".to_string(),
        'D' => "double".to_string(),
        'V' if dimensions == 0 => "void".to_string(),
        'L' => {
            let mut binary = String::new();
            loop {
                match chars.next()? {
                    ';' => break,
                    c => binary.push(c),
                }
            }
            if binary.is_empty() {
                return None;
            }
            binary.replace('/', ".")
        }
        _ => return None,
    };

    Some(format!("{}{}", base, "[]".repeat(dimensions)))
}
