//! # Message Schema
//!
//! Every message starts with `op:uint32 query_id:uint64`.
//!
//! ## Inbound
//!
//! | Message | Opcode | Gate |
//! |---------|--------|------|
//! | `AddRouter` | `0x52656701` | admin |
//! | `RemoveRouter` | `0x52656702` | admin |
//! | `AddRouterBatch` | `0x52656703` | admin |
//! | `RemoveRouterBatch` | `0x52656704` | admin |
//! | `SetRouters` | `0x52656705` | admin |
//! | `ValidateRouter` | `0x52656706` | any |
//! | `GetAllRouters` | `0x52656707` | any |
//! | `GiveOwnership` | `0x52656708` | admin |
//! | `TakeOwnership` | `0x52656709` | next admin |
//! | `SetCode` | `0x5265670a` | admin |
//!
//! ## Outbound
//!
//! | Message | Opcode |
//! |---------|--------|
//! | `RouterValidatedMessage` | `0x52656781` |
//! | `AllRoutersMessage` | `0x52656782` |

use crate::codec::{BitReader, BitString, BitWriter, Load, Maybe, PackedRouterDict, Store};
use crate::domain::dictionary::RouterDict;
use crate::domain::value_objects::{Address, QueryId, RouterDescription};
use crate::errors::CodecError;

// =============================================================================
// OPCODES
// =============================================================================

/// Message discriminators.
pub mod opcodes {
    /// Width of the opcode field.
    pub const OPCODE_BITS: u32 = 32;

    pub const ADD_ROUTER: u32 = 0x5265_6701;
    pub const REMOVE_ROUTER: u32 = 0x5265_6702;
    pub const ADD_ROUTER_BATCH: u32 = 0x5265_6703;
    pub const REMOVE_ROUTER_BATCH: u32 = 0x5265_6704;
    pub const SET_ROUTERS: u32 = 0x5265_6705;
    pub const VALIDATE_ROUTER: u32 = 0x5265_6706;
    pub const GET_ALL_ROUTERS: u32 = 0x5265_6707;
    pub const GIVE_OWNERSHIP: u32 = 0x5265_6708;
    pub const TAKE_OWNERSHIP: u32 = 0x5265_6709;
    pub const SET_CODE: u32 = 0x5265_670a;

    pub const ROUTER_VALIDATED: u32 = 0x5265_6781;
    pub const ALL_ROUTERS: u32 = 0x5265_6782;
}

/// Opaque caller payload echoed into the response.
pub type ForwardPayload = Maybe<BitString>;

// =============================================================================
// INBOUND MESSAGES
// =============================================================================

/// Register or overwrite one router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddRouter {
    pub query_id: QueryId,
    pub router: Address,
    pub description: RouterDescription,
}

/// Remove one router that must exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveRouter {
    pub query_id: QueryId,
    pub router: Address,
}

/// Upsert every entry of a map.
///
/// The map stays packed until the sender has been authorised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddRouterBatch {
    pub query_id: QueryId,
    pub routers: Maybe<PackedRouterDict>,
}

/// Remove every key of a map; values are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoveRouterBatch {
    pub query_id: QueryId,
    pub routers: Maybe<PackedRouterDict>,
}

/// Replace the whole router set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetRouters {
    pub query_id: QueryId,
    pub routers: Maybe<PackedRouterDict>,
}

/// Ask for one router's record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidateRouter {
    pub query_id: QueryId,
    pub router: Address,
    pub response: Address,
    pub forward_payload: ForwardPayload,
}

/// Ask for the whole router set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetAllRouters {
    pub query_id: QueryId,
    pub response: Address,
    pub forward_payload: ForwardPayload,
}

/// Nominate the next admin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GiveOwnership {
    pub query_id: QueryId,
    pub next_admin: Address,
}

/// Accept a nomination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TakeOwnership {
    pub query_id: QueryId,
}

/// Replace the actor's code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetCode {
    pub query_id: QueryId,
    pub code: BitString,
}

/// Closed set of inbound registry messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryMessage {
    AddRouter(AddRouter),
    RemoveRouter(RemoveRouter),
    AddRouterBatch(AddRouterBatch),
    RemoveRouterBatch(RemoveRouterBatch),
    SetRouters(SetRouters),
    ValidateRouter(ValidateRouter),
    GetAllRouters(GetAllRouters),
    GiveOwnership(GiveOwnership),
    TakeOwnership(TakeOwnership),
    SetCode(SetCode),
}

impl RegistryMessage {
    /// Wire discriminator.
    #[must_use]
    pub fn opcode(&self) -> u32 {
        match self {
            Self::AddRouter(_) => opcodes::ADD_ROUTER,
            Self::RemoveRouter(_) => opcodes::REMOVE_ROUTER,
            Self::AddRouterBatch(_) => opcodes::ADD_ROUTER_BATCH,
            Self::RemoveRouterBatch(_) => opcodes::REMOVE_ROUTER_BATCH,
            Self::SetRouters(_) => opcodes::SET_ROUTERS,
            Self::ValidateRouter(_) => opcodes::VALIDATE_ROUTER,
            Self::GetAllRouters(_) => opcodes::GET_ALL_ROUTERS,
            Self::GiveOwnership(_) => opcodes::GIVE_OWNERSHIP,
            Self::TakeOwnership(_) => opcodes::TAKE_OWNERSHIP,
            Self::SetCode(_) => opcodes::SET_CODE,
        }
    }

    /// Correlation id carried by the message.
    #[must_use]
    pub fn query_id(&self) -> QueryId {
        match self {
            Self::AddRouter(m) => m.query_id,
            Self::RemoveRouter(m) => m.query_id,
            Self::AddRouterBatch(m) => m.query_id,
            Self::RemoveRouterBatch(m) => m.query_id,
            Self::SetRouters(m) => m.query_id,
            Self::ValidateRouter(m) => m.query_id,
            Self::GetAllRouters(m) => m.query_id,
            Self::GiveOwnership(m) => m.query_id,
            Self::TakeOwnership(m) => m.query_id,
            Self::SetCode(m) => m.query_id,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddRouter(_) => "AddRouter",
            Self::RemoveRouter(_) => "RemoveRouter",
            Self::AddRouterBatch(_) => "AddRouterBatch",
            Self::RemoveRouterBatch(_) => "RemoveRouterBatch",
            Self::SetRouters(_) => "SetRouters",
            Self::ValidateRouter(_) => "ValidateRouter",
            Self::GetAllRouters(_) => "GetAllRouters",
            Self::GiveOwnership(_) => "GiveOwnership",
            Self::TakeOwnership(_) => "TakeOwnership",
            Self::SetCode(_) => "SetCode",
        }
    }

    fn load_fields(opcode: u32, r: &mut BitReader<'_>) -> Result<Option<Self>, CodecError> {
        let message = match opcode {
            opcodes::ADD_ROUTER => Self::AddRouter(AddRouter {
                query_id: r.load_u64()?,
                router: Address::load(r)?,
                description: RouterDescription::load(r)?,
            }),
            opcodes::REMOVE_ROUTER => Self::RemoveRouter(RemoveRouter {
                query_id: r.load_u64()?,
                router: Address::load(r)?,
            }),
            opcodes::ADD_ROUTER_BATCH => Self::AddRouterBatch(AddRouterBatch {
                query_id: r.load_u64()?,
                routers: Maybe::load(r)?,
            }),
            opcodes::REMOVE_ROUTER_BATCH => Self::RemoveRouterBatch(RemoveRouterBatch {
                query_id: r.load_u64()?,
                routers: Maybe::load(r)?,
            }),
            opcodes::SET_ROUTERS => Self::SetRouters(SetRouters {
                query_id: r.load_u64()?,
                routers: Maybe::load(r)?,
            }),
            opcodes::VALIDATE_ROUTER => Self::ValidateRouter(ValidateRouter {
                query_id: r.load_u64()?,
                router: Address::load(r)?,
                response: Address::load(r)?,
                forward_payload: Maybe::load(r)?,
            }),
            opcodes::GET_ALL_ROUTERS => Self::GetAllRouters(GetAllRouters {
                query_id: r.load_u64()?,
                response: Address::load(r)?,
                forward_payload: Maybe::load(r)?,
            }),
            opcodes::GIVE_OWNERSHIP => Self::GiveOwnership(GiveOwnership {
                query_id: r.load_u64()?,
                next_admin: Address::load(r)?,
            }),
            opcodes::TAKE_OWNERSHIP => Self::TakeOwnership(TakeOwnership {
                query_id: r.load_u64()?,
            }),
            opcodes::SET_CODE => Self::SetCode(SetCode {
                query_id: r.load_u64()?,
                code: r.load_ref()?.rest(),
            }),
            _ => return Ok(None),
        };
        Ok(Some(message))
    }
}

impl Store for RegistryMessage {
    fn store(&self, w: &mut BitWriter) -> Result<(), CodecError> {
        w.store_uint(u64::from(self.opcode()), opcodes::OPCODE_BITS)
            .store_uint(self.query_id(), 64);
        match self {
            Self::AddRouter(m) => {
                m.router.store(w)?;
                m.description.store(w)
            }
            Self::RemoveRouter(m) => m.router.store(w),
            Self::AddRouterBatch(m) => m.routers.store(w),
            Self::RemoveRouterBatch(m) => m.routers.store(w),
            Self::SetRouters(m) => m.routers.store(w),
            Self::ValidateRouter(m) => {
                m.router.store(w)?;
                m.response.store(w)?;
                m.forward_payload.store(w)
            }
            Self::GetAllRouters(m) => {
                m.response.store(w)?;
                m.forward_payload.store(w)
            }
            Self::GiveOwnership(m) => m.next_admin.store(w),
            Self::TakeOwnership(_) => Ok(()),
            Self::SetCode(m) => {
                w.store_ref(&m.code)?;
                Ok(())
            }
        }
    }
}

/// Result of decoding an inbound body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundBody {
    /// No bits at all: a plain transfer, accepted as a no-op.
    Empty,
    /// A recognised message.
    Message(RegistryMessage),
    /// An opcode that matches no message; its fields are not read.
    Unknown { opcode: u32 },
}

impl InboundBody {
    /// Decodes a message body.
    ///
    /// Bits left over after a complete message are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Underflow` if the opcode, or a known message's
    /// fields, cannot be fully read.
    pub fn decode(body: &BitString) -> Result<Self, CodecError> {
        if body.is_empty() {
            return Ok(Self::Empty);
        }
        let mut r = body.reader();
        let opcode = r.load_u32()?;
        Ok(match RegistryMessage::load_fields(opcode, &mut r)? {
            Some(message) => Self::Message(message),
            None => Self::Unknown { opcode },
        })
    }
}

// =============================================================================
// OUTBOUND MESSAGES
// =============================================================================

/// Response to `ValidateRouter`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouterValidatedMessage {
    pub query_id: QueryId,
    pub router: Address,
    pub details: RouterDescription,
    pub forward_payload: ForwardPayload,
}

impl Store for RouterValidatedMessage {
    fn store(&self, w: &mut BitWriter) -> Result<(), CodecError> {
        w.store_uint(u64::from(opcodes::ROUTER_VALIDATED), opcodes::OPCODE_BITS)
            .store_uint(self.query_id, 64);
        self.router.store(w)?;
        self.details.store(w)?;
        self.forward_payload.store(w)
    }
}

impl Load for RouterValidatedMessage {
    fn load(r: &mut BitReader<'_>) -> Result<Self, CodecError> {
        expect_opcode(r, opcodes::ROUTER_VALIDATED)?;
        Ok(Self {
            query_id: r.load_u64()?,
            router: Address::load(r)?,
            details: RouterDescription::load(r)?,
            forward_payload: Maybe::load(r)?,
        })
    }
}

/// Response to `GetAllRouters`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllRoutersMessage {
    pub query_id: QueryId,
    pub routers: Maybe<RouterDict>,
    pub forward_payload: ForwardPayload,
}

impl Store for AllRoutersMessage {
    fn store(&self, w: &mut BitWriter) -> Result<(), CodecError> {
        w.store_uint(u64::from(opcodes::ALL_ROUTERS), opcodes::OPCODE_BITS)
            .store_uint(self.query_id, 64);
        self.routers.store(w)?;
        self.forward_payload.store(w)
    }
}

impl Load for AllRoutersMessage {
    fn load(r: &mut BitReader<'_>) -> Result<Self, CodecError> {
        expect_opcode(r, opcodes::ALL_ROUTERS)?;
        Ok(Self {
            query_id: r.load_u64()?,
            routers: Maybe::load(r)?,
            forward_payload: Maybe::load(r)?,
        })
    }
}

fn expect_opcode(r: &mut BitReader<'_>, expected: u32) -> Result<(), CodecError> {
    let opcode = r.load_u32()?;
    if opcode != expected {
        return Err(CodecError::UnexpectedOpcode { expected, found: opcode });
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
