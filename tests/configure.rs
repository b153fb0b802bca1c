//! Process-wide configuration. Kept in its own test binary: the config can
//! only be installed once per process.

mod common;

use anyhow::Result;
use concept_map::{
    clause, concept_map, configure, Concept, ConceptMapError, ConfigError, DuplicatePolicy,
    ResolutionConfig,
};

clause! { struct Sound = "sound": fn() -> &'static str; }

#[derive(Concept)]
#[concept(clauses(Sound))]
struct Noisy;

#[derive(Concept)]
#[concept(clauses(Sound))]
struct Loud;

#[derive(Concept)]
#[concept(refines(Noisy, Loud))]
struct Band;

struct Drum;

concept_map! {
    impl Models<Noisy> for Drum {
        Sound => || "boom",
    }
}

concept_map! {
    impl Models<Loud> for Drum {
        Sound => || "BOOM",
    }
}

concept_map! {
    impl Models<Band> for Drum {}
}

#[test]
fn installed_policy_governs_canonical_maps() -> Result<()> {
    common::init_tracing();

    configure(ResolutionConfig::from_yaml("duplicates: reject")?)?;
    assert!(matches!(
        configure(ResolutionConfig::new(DuplicatePolicy::FirstWins)),
        Err(ConfigError::AlreadyConfigured)
    ));
    assert_eq!(concept_map::config::current().duplicates, DuplicatePolicy::Reject);

    assert_eq!(concept_map::<Noisy, Drum>()?.erased(Sound)?(), "boom");
    assert!(matches!(
        concept_map::<Band, Drum>(),
        Err(ConceptMapError::AmbiguousBinding { name: "sound", .. })
    ));
    Ok(())
}
