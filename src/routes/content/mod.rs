pub(crate) mod handler;
mod model;

pub use handler::{generate_flyer, generate_social_post, generate_welcome_materials};
pub use model::{
    ContentKind, ContentResponse, FlyerGenerationRequest, SocialPostRequest,
    WelcomeMaterialRequest,
};
