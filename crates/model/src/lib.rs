//! Public API surface model and raw change facts.
//!
//! Immutable value types describing one release of a library's public
//! surface (classes, members, modifiers, metadata tags) and the primitive
//! incompatibility facts an external structural comparator derives from
//! two such snapshots. Everything here is read-only input to the policy
//! engine; nothing in this crate decides whether a change is acceptable.

pub mod change;
pub mod member;
pub mod surface;

pub use change::{ChangeSet, Incompatibility, ReasonKind};
pub use member::{parse_method_descriptor, MemberId, MemberKind, MethodSignature};
pub use surface::{ApiClass, ApiMember, ApiSurface, MemberTags};
