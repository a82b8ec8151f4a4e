#[cfg(feature = "version")]
fn main() {
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("failed to generate build metadata.");
}

#[cfg(not(feature = "version"))]
fn main() {}
