//! Game action definitions

/// All actions the game reacts to.
///
/// Keyboard mapping:
/// - Left / Right arrows = walk
/// - Up arrow = jump (hold for a higher jump)
/// - Space = pull a switch
/// - P = skip to the next level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Interact,
    SkipLevel,
}
