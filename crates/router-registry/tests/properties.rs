//! # Registry Property Tests
//!
//! Randomised checks of the snapshot codec and the router-set handlers.

use proptest::prelude::*;
use router_registry::prelude::*;
use router_registry::state_machine::{dispatch, InvocationContext};

// =============================================================================
// STRATEGIES
// =============================================================================

fn arb_hash() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>()
}

fn arb_address() -> impl Strategy<Value = Address> {
    (any::<i8>(), arb_hash()).prop_map(|(workchain, hash)| Address::new(workchain, hash))
}

fn arb_admin() -> impl Strategy<Value = Address> {
    arb_hash()
        .prop_filter("admin is never the sentinel", |hash| *hash != [0u8; 32])
        .prop_map(Address::basechain)
}

fn arb_description() -> impl Strategy<Value = RouterDescription> {
    (any::<[u8; 32]>(), any::<u32>(), any::<u8>(), any::<u8>(), "[a-z0-9]{0,32}").prop_map(
        |(id, router_type, major, minor, dev)| RouterDescription {
            router_id: U256::from_big_endian(&id),
            router_type,
            version: RouterVersion {
                major,
                minor,
                development: DevelopmentTag::from_text(&dev).unwrap_or_default(),
            },
        },
    )
}

fn arb_dict(max: usize) -> impl Strategy<Value = RouterDict> {
    prop::collection::vec((arb_hash(), arb_description()), 0..max).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(hash, desc)| (Address::basechain(hash).dict_key(), desc))
            .collect()
    })
}

fn arb_registry() -> impl Strategy<Value = Registry> {
    (arb_admin(), arb_address(), prop::option::of(arb_dict(8))).prop_map(
        |(admin, next_admin, routers)| {
            Registry::from_parts(admin, next_admin, routers.filter(|d| !d.is_empty()).into())
        },
    )
}

fn ctx(sender: Address) -> InvocationContext {
    InvocationContext {
        sender,
        value: 50_000_000,
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the persisted snapshot decodes to what was encoded.
    #[test]
    fn prop_snapshot_codec_is_lossless(registry in arb_registry()) {
        let bits = encode(&registry).unwrap();
        let back: Registry = decode(&bits).unwrap();
        prop_assert_eq!(back, registry);
    }

    /// Property: a stored router reads back unchanged.
    #[test]
    fn prop_add_then_lookup(
        registry in arb_registry(),
        hash in arb_hash(),
        desc in arb_description(),
    ) {
        let admin = registry.admin();
        let router = Address::basechain(hash);
        let message = RegistryMessage::AddRouter(AddRouter {
            query_id: 1,
            router,
            description: desc,
        });
        let next = dispatch(registry, &ctx(admin), message, &RegistryConfig::default())
            .unwrap()
            .registry;
        prop_assert_eq!(next.router(&router), Some(&desc));
    }

    /// Property: removing the same batch twice equals removing it once.
    #[test]
    fn prop_remove_batch_is_idempotent(registry in arb_registry(), batch in arb_dict(8)) {
        let admin = registry.admin();
        let config = RegistryConfig::default();
        let message = RegistryMessage::RemoveRouterBatch(RemoveRouterBatch {
            query_id: 1,
            routers: Maybe::Just(PackedRouterDict::pack(&batch).unwrap()),
        });
        let once = dispatch(registry, &ctx(admin), message.clone(), &config).unwrap().registry;
        let twice = dispatch(once.clone(), &ctx(admin), message, &config).unwrap().registry;
        prop_assert_eq!(twice, once);
    }

    /// Property: the stored router set is never present-but-empty.
    #[test]
    fn prop_set_routers_is_canonical(registry in arb_registry(), routers in arb_dict(6)) {
        let admin = registry.admin();
        let expected_absent = routers.is_empty();
        let message = RegistryMessage::SetRouters(SetRouters {
            query_id: 1,
            routers: Maybe::Just(PackedRouterDict::pack(&routers).unwrap()),
        });
        let next = dispatch(registry, &ctx(admin), message, &RegistryConfig::default())
            .unwrap()
            .registry;
        prop_assert_eq!(next.routers.is_absent(), expected_absent);
        prop_assert!(check_all_invariants(&next).is_ok());
    }

    /// Property: single removal of a missing key fails, batch removal does not.
    #[test]
    fn prop_missing_key_removal(registry in arb_registry(), hash in arb_hash()) {
        let router = Address::basechain(hash);
        prop_assume!(registry.router(&router).is_none());
        let admin = registry.admin();
        let config = RegistryConfig::default();

        let single = RegistryMessage::RemoveRouter(RemoveRouter { query_id: 1, router });
        let result = dispatch(registry.clone(), &ctx(admin), single, &config);
        prop_assert_eq!(result, Err(RegistryError::RouterNotFound(router)));

        let missing: RouterDict =
            std::iter::once((router.dict_key(), RouterDescription::default())).collect();
        let batch = RegistryMessage::RemoveRouterBatch(RemoveRouterBatch {
            query_id: 2,
            routers: Maybe::Just(PackedRouterDict::pack(&missing).unwrap()),
        });
        let next = dispatch(registry.clone(), &ctx(admin), batch, &config).unwrap().registry;
        prop_assert_eq!(next, registry);
    }

    /// Property: anyone other than the admin is rejected before any change.
    #[test]
    fn prop_non_admin_cannot_mutate(
        registry in arb_registry(),
        sender in arb_address(),
        routers in arb_dict(4),
    ) {
        prop_assume!(sender != registry.admin());
        let message = RegistryMessage::SetRouters(SetRouters {
            query_id: 1,
            routers: Maybe::Just(PackedRouterDict::pack(&routers).unwrap()),
        });
        let result = dispatch(registry, &ctx(sender), message, &RegistryConfig::default());
        prop_assert_eq!(result, Err(RegistryError::AccessDenied(AccessDenied::NotAdmin)));
    }
}
