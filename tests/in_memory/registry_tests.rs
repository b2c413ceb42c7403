//! In-memory integration tests for registration and lookup.

use std::collections::HashSet;
use std::sync::Arc;

use rstest::rstest;
use switchboard::interaction::{
    domain::{CommandScope, InteractionDomainError, TargetId},
    services::{InteractionRegistry, RegistryError},
};

use super::helpers::registry;

#[rstest]
fn duplicate_name_leaves_registry_unchanged(registry: Arc<InteractionRegistry>) {
    let first = registry
        .register_command("ping", CommandScope::Global)
        .expect("first registration should succeed");
    let target = TargetId::new("guild-1").expect("valid target");

    let result = registry.register_command("ping", CommandScope::Target(target));

    assert!(matches!(result, Err(RegistryError::DuplicateCommand(_))));
    assert_eq!(registry.commands().len(), 1);
    let kept = registry.command("ping").expect("original command should remain");
    assert!(Arc::ptr_eq(&kept, &first));
    assert_eq!(kept.scope(), &CommandScope::Global);
}

#[rstest]
#[case("", RegistryError::Domain(InteractionDomainError::EmptyCommandName))]
#[case(
    "Ping",
    RegistryError::Domain(InteractionDomainError::InvalidCommandName("Ping".to_owned()))
)]
#[case(
    "has space",
    RegistryError::Domain(InteractionDomainError::InvalidCommandName("has space".to_owned()))
)]
fn invalid_names_are_rejected(
    registry: Arc<InteractionRegistry>,
    #[case] name: &str,
    #[case] expected: RegistryError,
) {
    let result = registry.register_command(name, CommandScope::Global);

    assert_eq!(result.err(), Some(expected));
    assert!(registry.commands().is_empty());
}

#[rstest]
fn button_tokens_stay_unique(registry: Arc<InteractionRegistry>) {
    let tokens: HashSet<String> = (0..1_000)
        .map(|_| registry.register_button().token().as_str().to_owned())
        .collect();

    assert_eq!(tokens.len(), 1_000);
    assert_eq!(registry.button_count(), 1_000);
    assert!(tokens.iter().all(|token| registry.button(token).is_some()));
}

#[rstest]
fn dirty_commands_follow_registration_order(registry: Arc<InteractionRegistry>) {
    for name in ["zeta", "alpha", "mid"] {
        registry
            .register_command(name, CommandScope::Global)
            .expect("registration should succeed");
    }

    let dirty: Vec<String> = registry
        .dirty_commands()
        .iter()
        .map(|command| command.name().as_str().to_owned())
        .collect();

    assert_eq!(dirty, ["zeta", "alpha", "mid"]);
}
