mod car;
mod feedback;
mod interaction;
mod persona;

pub use car::{Car, CarId};
pub use feedback::{Feedback, FeedbackKind, NewFeedback};
pub use interaction::{Interaction, InteractionKind, NewInteraction};
pub use persona::{FeatureVector, Persona, UnknownPersona, FEATURE_DIMENSIONS};
