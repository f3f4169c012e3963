//! # Registry State Machine
//!
//! Pure dispatch of one decoded message against one snapshot.
//!
//! Each handler takes the snapshot by value and either returns the new
//! snapshot with its actions, or an error. The caller still holds the previous
//! persisted snapshot, so an error leaves state untouched.
//!
//! | Message | Gate | Failure |
//! |---------|------|---------|
//! | `AddRouter` | admin | `InvalidWorkchain` |
//! | `RemoveRouter` | admin | `RouterNotFound` |
//! | `AddRouterBatch` | admin | malformed map |
//! | `RemoveRouterBatch` | admin | malformed map (missing keys skipped) |
//! | `SetRouters` | admin | malformed map |
//! | `ValidateRouter` | any | `InsufficientBudget`, `RouterNotFound` |
//! | `GetAllRouters` | any | `InsufficientBudget` |
//! | `GiveOwnership` | admin | - |
//! | `TakeOwnership` | next admin | - |
//! | `SetCode` | admin | - |

use crate::codec::{encode, Maybe, PackedRouterDict, Store};
use crate::config::RegistryConfig;
use crate::domain::dictionary::RouterDict;
use crate::domain::entities::{Action, OutboundMessage, Registry, Transition};
use crate::domain::value_objects::{Address, RouterDescription};
use crate::errors::RegistryError;
use crate::messages::{
    AddRouter, AddRouterBatch, AllRoutersMessage, GetAllRouters, GiveOwnership, InboundBody,
    RegistryMessage, RemoveRouter, RemoveRouterBatch, RouterValidatedMessage, SetCode,
    SetRouters, TakeOwnership, ValidateRouter,
};

/// Who sent the message and what it carried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvocationContext {
    /// Authenticated sender.
    pub sender: Address,
    /// Attached value.
    pub value: u64,
}

type HandlerResult = Result<Transition, RegistryError>;

/// Applies a decoded body; empty bodies are no-ops, unknown opcodes fail.
///
/// # Errors
///
/// Returns `RegistryError::UnknownOperation` for unknown opcodes, otherwise
/// whatever the matching handler returns.
pub fn apply(
    registry: Registry,
    ctx: &InvocationContext,
    body: InboundBody,
    config: &RegistryConfig,
) -> HandlerResult {
    match body {
        InboundBody::Empty => Ok(Transition::state_only(registry)),
        InboundBody::Unknown { opcode } => Err(RegistryError::UnknownOperation(opcode)),
        InboundBody::Message(message) => dispatch(registry, ctx, message, config),
    }
}

/// Routes one message to its handler.
///
/// # Errors
///
/// Returns the handler's error; see the table in the module docs.
pub fn dispatch(
    registry: Registry,
    ctx: &InvocationContext,
    message: RegistryMessage,
    config: &RegistryConfig,
) -> HandlerResult {
    match message {
        RegistryMessage::AddRouter(m) => add_router(registry, ctx, m),
        RegistryMessage::RemoveRouter(m) => remove_router(registry, ctx, m),
        RegistryMessage::AddRouterBatch(m) => add_router_batch(registry, ctx, m),
        RegistryMessage::RemoveRouterBatch(m) => remove_router_batch(registry, ctx, m),
        RegistryMessage::SetRouters(m) => set_routers(registry, ctx, m),
        RegistryMessage::ValidateRouter(m) => validate_router(registry, ctx, m, config),
        RegistryMessage::GetAllRouters(m) => get_all_routers(registry, ctx, m, config),
        RegistryMessage::GiveOwnership(m) => give_ownership(registry, ctx, m),
        RegistryMessage::TakeOwnership(m) => take_ownership(registry, ctx, m),
        RegistryMessage::SetCode(m) => set_code(registry, ctx, m),
    }
}

// =============================================================================
// ROUTER MANAGEMENT
// =============================================================================

// Batch maps are parsed here, after the admin check, so a bad map from a
// non-admin still reports `NotAdmin`.
fn unpack(routers: &Maybe<PackedRouterDict>) -> Result<Option<RouterDict>, RegistryError> {
    match routers {
        Maybe::Nothing => Ok(None),
        Maybe::Just(packed) => Ok(Some(packed.unpack()?)),
    }
}

fn add_router(mut registry: Registry, ctx: &InvocationContext, m: AddRouter) -> HandlerResult {
    registry.access.ensure_admin(&ctx.sender)?;
    if !m.router.is_basechain() {
        return Err(RegistryError::InvalidWorkchain {
            workchain: m.router.workchain,
        });
    }
    registry.routers.upsert(m.router.dict_key(), m.description);
    Ok(Transition::state_only(registry))
}

fn remove_router(mut registry: Registry, ctx: &InvocationContext, m: RemoveRouter) -> HandlerResult {
    registry.access.ensure_admin(&ctx.sender)?;
    if !registry.routers.remove(&m.router.dict_key()) {
        return Err(RegistryError::RouterNotFound(m.router));
    }
    Ok(Transition::state_only(registry))
}

// Batch keys are bare hashes and always denote basechain addresses, so there
// is no workchain left to validate.
fn add_router_batch(
    mut registry: Registry,
    ctx: &InvocationContext,
    m: AddRouterBatch,
) -> HandlerResult {
    registry.access.ensure_admin(&ctx.sender)?;
    if let Some(batch) = unpack(&m.routers)? {
        for (key, description) in &batch {
            registry.routers.upsert(*key, *description);
        }
    }
    Ok(Transition::state_only(registry))
}

fn remove_router_batch(
    mut registry: Registry,
    ctx: &InvocationContext,
    m: RemoveRouterBatch,
) -> HandlerResult {
    registry.access.ensure_admin(&ctx.sender)?;
    if let Some(batch) = unpack(&m.routers)? {
        for key in batch.keys() {
            registry.routers.remove(key);
        }
    }
    Ok(Transition::state_only(registry))
}

fn set_routers(mut registry: Registry, ctx: &InvocationContext, m: SetRouters) -> HandlerResult {
    registry.access.ensure_admin(&ctx.sender)?;
    let routers = unpack(&m.routers)?.unwrap_or_default();
    registry.routers.replace_all(routers);
    Ok(Transition::state_only(registry))
}

// =============================================================================
// QUERIES
// =============================================================================

fn ensure_budget(ctx: &InvocationContext, config: &RegistryConfig) -> Result<(), RegistryError> {
    if ctx.value < config.min_response_value {
        return Err(RegistryError::InsufficientBudget {
            required: config.min_response_value,
            attached: ctx.value,
        });
    }
    Ok(())
}

fn reply<T: Store>(ctx: &InvocationContext, destination: Address, body: &T) -> Result<Action, RegistryError> {
    Ok(Action::SendMessage(OutboundMessage {
        destination,
        value: ctx.value,
        body: encode(body)?,
    }))
}

fn validate_router(
    registry: Registry,
    ctx: &InvocationContext,
    m: ValidateRouter,
    config: &RegistryConfig,
) -> HandlerResult {
    ensure_budget(ctx, config)?;
    let details: RouterDescription = *registry
        .router(&m.router)
        .ok_or(RegistryError::RouterNotFound(m.router))?;
    let response = RouterValidatedMessage {
        query_id: m.query_id,
        router: m.router,
        details,
        forward_payload: m.forward_payload,
    };
    let action = reply(ctx, m.response, &response)?;
    Ok(Transition {
        registry,
        actions: vec![action],
    })
}

fn get_all_routers(
    registry: Registry,
    ctx: &InvocationContext,
    m: GetAllRouters,
    config: &RegistryConfig,
) -> HandlerResult {
    ensure_budget(ctx, config)?;
    let response = AllRoutersMessage {
        query_id: m.query_id,
        routers: registry.routers.as_maybe().clone(),
        forward_payload: m.forward_payload,
    };
    let action = reply(ctx, m.response, &response)?;
    Ok(Transition {
        registry,
        actions: vec![action],
    })
}

// =============================================================================
// OWNERSHIP AND CODE
// =============================================================================

fn give_ownership(mut registry: Registry, ctx: &InvocationContext, m: GiveOwnership) -> HandlerResult {
    registry.access.give_ownership(&ctx.sender, m.next_admin)?;
    Ok(Transition::state_only(registry))
}

fn take_ownership(mut registry: Registry, ctx: &InvocationContext, _m: TakeOwnership) -> HandlerResult {
    registry.access.take_ownership(&ctx.sender)?;
    Ok(Transition::state_only(registry))
}

fn set_code(registry: Registry, ctx: &InvocationContext, m: SetCode) -> HandlerResult {
    registry.access.ensure_admin(&ctx.sender)?;
    Ok(Transition {
        registry,
        actions: vec![Action::SetCode(m.code)],
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, BitString};
    use crate::domain::value_objects::{DevelopmentTag, RouterVersion, U256};
    use crate::errors::AccessDenied;

    const VALUE: u64 = 50_000_000;

    fn addr(byte: u8) -> Address {
        Address::basechain([byte; 32])
    }

    fn admin_ctx() -> InvocationContext {
        InvocationContext { sender: addr(0xAD), value: VALUE }
    }

    fn user_ctx() -> InvocationContext {
        InvocationContext { sender: addr(0x55), value: VALUE }
    }

    fn fresh() -> Registry {
        Registry::new(addr(0xAD))
    }

    fn desc(id: u64) -> RouterDescription {
        RouterDescription {
            router_id: U256::from(id),
            router_type: 7,
            version: RouterVersion {
                major: 2,
                minor: 1,
                development: DevelopmentTag::from_text("release").unwrap(),
            },
        }
    }

    fn add(registry: Registry, router: Address, d: RouterDescription) -> Registry {
        let msg = RegistryMessage::AddRouter(AddRouter { query_id: 1, router, description: d });
        dispatch(registry, &admin_ctx(), msg, &RegistryConfig::default())
            .unwrap()
            .registry
    }

    fn dict(entries: &[(u8, u64)]) -> RouterDict {
        entries
            .iter()
            .map(|(b, id)| (addr(*b).dict_key(), desc(*id)))
            .collect()
    }

    fn packed(entries: &[(u8, u64)]) -> Maybe<PackedRouterDict> {
        Maybe::Just(PackedRouterDict::pack(&dict(entries)).unwrap())
    }

    #[test]
    fn test_add_router_by_admin() {
        let registry = add(fresh(), addr(1), desc(1));
        assert_eq!(registry.router(&addr(1)), Some(&desc(1)));
    }

    #[test]
    fn test_add_router_by_user_is_rejected() {
        let msg = RegistryMessage::AddRouter(AddRouter {
            query_id: 1,
            router: addr(1),
            description: desc(1),
        });
        let err = dispatch(fresh(), &user_ctx(), msg, &RegistryConfig::default()).unwrap_err();
        assert_eq!(err, RegistryError::AccessDenied(AccessDenied::NotAdmin));
    }

    #[test]
    fn test_admin_check_precedes_workchain_check() {
        let msg = RegistryMessage::AddRouter(AddRouter {
            query_id: 1,
            router: Address::new(-1, [1; 32]),
            description: desc(1),
        });
        let err = dispatch(fresh(), &user_ctx(), msg.clone(), &RegistryConfig::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 124);

        let err = dispatch(fresh(), &admin_ctx(), msg, &RegistryConfig::default()).unwrap_err();
        assert_eq!(err, RegistryError::InvalidWorkchain { workchain: -1 });
    }

    #[test]
    fn test_remove_missing_router_fails() {
        let msg = RegistryMessage::RemoveRouter(RemoveRouter { query_id: 1, router: addr(9) });
        let err = dispatch(fresh(), &admin_ctx(), msg, &RegistryConfig::default()).unwrap_err();
        assert_eq!(err, RegistryError::RouterNotFound(addr(9)));
    }

    #[test]
    fn test_remove_last_router_collapses_store() {
        let registry = add(fresh(), addr(1), desc(1));
        let msg = RegistryMessage::RemoveRouter(RemoveRouter { query_id: 1, router: addr(1) });
        let registry = dispatch(registry, &admin_ctx(), msg, &RegistryConfig::default())
            .unwrap()
            .registry;
        assert!(registry.routers.is_absent());
    }

    #[test]
    fn test_batch_add_and_remove() {
        let msg = RegistryMessage::AddRouterBatch(AddRouterBatch {
            query_id: 1,
            routers: packed(&[(1, 1), (2, 2), (3, 3)]),
        });
        let registry = dispatch(fresh(), &admin_ctx(), msg, &RegistryConfig::default())
            .unwrap()
            .registry;
        assert_eq!(registry.routers.len(), 3);

        // Key 9 is absent and silently skipped.
        let msg = RegistryMessage::RemoveRouterBatch(RemoveRouterBatch {
            query_id: 2,
            routers: packed(&[(1, 0), (9, 0)]),
        });
        let registry = dispatch(registry, &admin_ctx(), msg, &RegistryConfig::default())
            .unwrap()
            .registry;
        assert_eq!(registry.routers.len(), 2);
        assert_eq!(registry.router(&addr(1)), None);
    }

    #[test]
    fn test_empty_batch_keeps_store_absent() {
        for routers in [Maybe::Nothing, packed(&[])] {
            let msg = RegistryMessage::AddRouterBatch(AddRouterBatch { query_id: 1, routers });
            let registry = dispatch(fresh(), &admin_ctx(), msg, &RegistryConfig::default())
                .unwrap()
                .registry;
            assert!(registry.routers.is_absent());
        }
    }

    fn unordered_map() -> Maybe<PackedRouterDict> {
        let mut w = crate::codec::BitWriter::new();
        for key in [5u64, 4] {
            w.store_u256(&U256::from(key));
            desc(key).store(&mut w).unwrap();
        }
        Maybe::Just(PackedRouterDict(w.finish()))
    }

    #[test]
    fn test_bad_batch_map_checks_admin_first() {
        let config = RegistryConfig::default();
        let messages = [
            RegistryMessage::AddRouterBatch(AddRouterBatch { query_id: 1, routers: unordered_map() }),
            RegistryMessage::RemoveRouterBatch(RemoveRouterBatch {
                query_id: 2,
                routers: unordered_map(),
            }),
            RegistryMessage::SetRouters(SetRouters { query_id: 3, routers: unordered_map() }),
        ];
        for msg in messages {
            let err = dispatch(fresh(), &user_ctx(), msg.clone(), &config).unwrap_err();
            assert_eq!(err, RegistryError::AccessDenied(AccessDenied::NotAdmin));

            let err = dispatch(fresh(), &admin_ctx(), msg, &config).unwrap_err();
            assert_eq!(err.exit_code(), 9);
        }
    }

    #[test]
    fn test_set_routers_replaces_everything() {
        let registry = add(fresh(), addr(1), desc(1));
        let msg = RegistryMessage::SetRouters(SetRouters {
            query_id: 1,
            routers: packed(&[(2, 2)]),
        });
        let registry = dispatch(registry, &admin_ctx(), msg, &RegistryConfig::default())
            .unwrap()
            .registry;
        assert_eq!(registry.router(&addr(1)), None);
        assert_eq!(registry.router(&addr(2)), Some(&desc(2)));

        let msg = RegistryMessage::SetRouters(SetRouters {
            query_id: 2,
            routers: packed(&[]),
        });
        let registry = dispatch(registry, &admin_ctx(), msg, &RegistryConfig::default())
            .unwrap()
            .registry;
        assert!(registry.routers.is_absent());
    }

    #[test]
    fn test_validate_router_emits_response() {
        let registry = add(fresh(), addr(1), desc(1));
        let forward = Maybe::Just(BitString::from_bytes(b"hello"));
        let msg = RegistryMessage::ValidateRouter(ValidateRouter {
            query_id: 10,
            router: addr(1),
            response: addr(0x77),
            forward_payload: forward.clone(),
        });
        let transition = dispatch(registry.clone(), &user_ctx(), msg, &RegistryConfig::default())
            .unwrap();
        assert_eq!(transition.registry, registry);

        let sent: Vec<_> = transition.messages().collect();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].destination, addr(0x77));
        assert_eq!(sent[0].value, VALUE);
        let body: RouterValidatedMessage = decode(&sent[0].body).unwrap();
        assert_eq!(
            body,
            RouterValidatedMessage {
                query_id: 10,
                router: addr(1),
                details: desc(1),
                forward_payload: forward,
            }
        );
    }

    #[test]
    fn test_validate_router_budget_and_missing() {
        let msg = RegistryMessage::ValidateRouter(ValidateRouter {
            query_id: 10,
            router: addr(1),
            response: addr(0x77),
            forward_payload: Maybe::Nothing,
        });
        let err = dispatch(fresh(), &user_ctx(), msg.clone(), &RegistryConfig::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 123);

        let poor = InvocationContext { sender: addr(0x55), value: 1 };
        let err = dispatch(fresh(), &poor, msg, &RegistryConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 127);
    }

    #[test]
    fn test_get_all_routers_sends_raw_map() {
        let msg = RegistryMessage::GetAllRouters(GetAllRouters {
            query_id: 3,
            response: addr(0x77),
            forward_payload: Maybe::Nothing,
        });
        let transition = dispatch(fresh(), &user_ctx(), msg, &RegistryConfig::default()).unwrap();
        let sent: Vec<_> = transition.messages().collect();
        let body: AllRoutersMessage = decode(&sent[0].body).unwrap();
        assert_eq!(body.routers, Maybe::Nothing);
        assert_eq!(body.query_id, 3);
    }

    #[test]
    fn test_ownership_transfer() {
        let msg = RegistryMessage::GiveOwnership(GiveOwnership { query_id: 1, next_admin: addr(2) });
        let registry = dispatch(fresh(), &admin_ctx(), msg, &RegistryConfig::default())
            .unwrap()
            .registry;

        let take = RegistryMessage::TakeOwnership(TakeOwnership { query_id: 2 });
        let err = dispatch(registry.clone(), &admin_ctx(), take.clone(), &RegistryConfig::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 126);

        let ctx = InvocationContext { sender: addr(2), value: VALUE };
        let registry = dispatch(registry, &ctx, take, &RegistryConfig::default())
            .unwrap()
            .registry;
        assert_eq!(registry.admin(), addr(2));
        assert_eq!(registry.next_admin(), Address::SENTINEL);
    }

    #[test]
    fn test_set_code_requires_admin() {
        let code = BitString::from_bytes(&[0xC0, 0xDE]);
        let msg = RegistryMessage::SetCode(SetCode { query_id: 1, code: code.clone() });
        let err = dispatch(fresh(), &user_ctx(), msg.clone(), &RegistryConfig::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 124);

        let transition = dispatch(fresh(), &admin_ctx(), msg, &RegistryConfig::default()).unwrap();
        assert_eq!(transition.registry, fresh());
        assert_eq!(transition.actions, vec![Action::SetCode(code)]);
    }

    #[test]
    fn test_apply_empty_and_unknown() {
        let config = RegistryConfig::default();
        let transition = apply(fresh(), &user_ctx(), InboundBody::Empty, &config).unwrap();
        assert_eq!(transition, Transition::state_only(fresh()));

        let err = apply(
            fresh(),
            &user_ctx(),
            InboundBody::Unknown { opcode: 0x1234_5678 },
            &config,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 0xFFFF);
    }
}
