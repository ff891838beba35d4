/// Read-only access to whatever a behavior tree runs against.
///
/// The kernel does not prescribe any queries; the agent crate defines the concrete world
/// (arena, live objects, physics, scene) and its nodes borrow it directly.
pub trait WorldView: 'static {}

/// Mutable access / effect sink. Tree nodes receive `&mut W` once per tick.
pub trait WorldMut: WorldView {}
