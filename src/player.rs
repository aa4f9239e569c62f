//! The player side of a multi-player round.
//!
//! A player is an opaque agent: the collision engine only reports outcomes back to it. Whether it
//! can interpret a collision is a capability tag ([`Player::handles_collisions`]) fixed by the
//! implementing type, not something probed at run time.

/// Callback interface used by [`CollisionEngine`][crate::CollisionEngine].
///
/// # Example
///
/// ```rust
/// use banditsim::Player;
///
/// /// Counts collisions instead of treating them as zero rewards.
/// #[derive(Default)]
/// struct Aloha {
///     rewards: f64,
///     collisions: u64,
/// }
///
/// impl Player for Aloha {
///     fn get_reward(&mut self, _arm: usize, reward: f64) {
///         self.rewards += reward;
///     }
///     fn handles_collisions(&self) -> bool {
///         true
///     }
///     fn handle_collision(&mut self, _arm: usize) {
///         self.collisions += 1;
///     }
/// }
///
/// let mut p = Aloha::default();
/// p.get_reward(0, 1.0);
/// p.handle_collision(0);
/// assert_eq!((p.rewards, p.collisions), (1.0, 1));
/// ```
pub trait Player {
    /// Record the reward obtained from `arm` this round.
    fn get_reward(&mut self, arm: usize, reward: f64);

    /// Whether this player wants [`Player::handle_collision`] notifications.
    ///
    /// Players without the capability are reported collisions according to the engine's
    /// [`CollisionFeedback`][crate::CollisionFeedback].
    fn handles_collisions(&self) -> bool {
        false
    }

    /// Told that the player chose `arm` but did not get it this round.
    fn handle_collision(&mut self, arm: usize) {
        let _ = arm;
    }
}

impl<P: Player + ?Sized> Player for Box<P> {
    fn get_reward(&mut self, arm: usize, reward: f64) {
        (**self).get_reward(arm, reward);
    }
    fn handles_collisions(&self) -> bool {
        (**self).handles_collisions()
    }
    fn handle_collision(&mut self, arm: usize) {
        (**self).handle_collision(arm);
    }
}

impl<P: Player + ?Sized> Player for &mut P {
    fn get_reward(&mut self, arm: usize, reward: f64) {
        (**self).get_reward(arm, reward);
    }
    fn handles_collisions(&self) -> bool {
        (**self).handles_collisions()
    }
    fn handle_collision(&mut self, arm: usize) {
        (**self).handle_collision(arm);
    }
}
