//! The operation abstraction shared by every record kind

use std::any::Any;
use std::fmt;

use crate::core::buffer::WireBuffer;
use crate::core::context::{PaintContext, PaintResult, RemoteContext};
use crate::core::reader::WireReader;
use crate::core::registry::RecordShape;
use crate::core::variables::{Resolver, VariableId};
use crate::error::Result;

/// A decoded, typed record
///
/// Operations are value objects. The only state that changes after decoding
/// is the resolved-value cache behind [`VariableSupport`].
pub trait Operation: fmt::Debug + fmt::Display + Send + Sync + 'static {
    fn opcode(&self) -> u32;

    /// Human-readable kind name
    fn name(&self) -> &'static str;

    /// Encode this operation as one record
    fn write(&self, buffer: &mut WireBuffer);

    /// Mutate shared context state, e.g. publish a declared variable
    fn apply(&self, _context: &mut dyn RemoteContext) {}

    /// Whether [`paint`](Self::paint) issues a backend call
    fn is_paint(&self) -> bool {
        false
    }

    /// Perform exactly one backend call
    fn paint(&self, _canvas: &mut dyn PaintContext) -> PaintResult {
        Ok(())
    }

    fn variable_support(&self) -> Option<&dyn VariableSupport> {
        None
    }

    fn variable_support_mut(&mut self) -> Option<&mut dyn VariableSupport> {
        None
    }

    fn deep_to_string(&self, indent: &str) -> String {
        format!("{indent}{self}")
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn Operation {
    pub fn downcast_ref<T: Operation>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Operation>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Receives the dependency edges of one operation at attach time
pub trait DependencyRegistrar {
    /// The operation reads variable `id` during its update
    fn listens_to(&mut self, id: VariableId);

    /// The operation publishes variable `id` when applied
    fn produces(&mut self, id: VariableId);
}

/// Operations that carry indirect values
pub trait VariableSupport {
    /// Declare every variable this operation reads or publishes
    fn register_listening(&self, registrar: &mut dyn DependencyRegistrar);

    /// Pull current variable values into local caches, and recompute derived results
    fn update_variables(&mut self, resolver: &mut Resolver<'_>);
}

/// Static side of an operation kind: its opcode, record shape and decoder
pub trait Decode: Operation + Sized {
    const OPCODE: u32;
    const NAME: &'static str;
    const SHAPE: RecordShape;

    fn decode(reader: &mut WireReader<'_>) -> Result<Self>;
}

/// Registry-compatible decoder for a [`Decode`] kind
pub fn decode_into<T: Decode>(
    reader: &mut WireReader<'_>,
    operations: &mut Vec<Box<dyn Operation>>,
) -> Result<()> {
    operations.push(Box::new(T::decode(reader)?));
    Ok(())
}

/// `opcode`, `name` and `as_any` from the kind's [`Decode`] impl
macro_rules! operation_identity {
    () => {
        fn opcode(&self) -> u32 {
            <Self as $crate::core::operation::Decode>::OPCODE
        }

        fn name(&self) -> &'static str {
            <Self as $crate::core::operation::Decode>::NAME
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    };
}

/// `variable_support` accessors for kinds implementing [`VariableSupport`]
macro_rules! variable_support {
    () => {
        fn variable_support(&self) -> Option<&dyn $crate::core::operation::VariableSupport> {
            Some(self)
        }

        fn variable_support_mut(
            &mut self,
        ) -> Option<&mut dyn $crate::core::operation::VariableSupport> {
            Some(self)
        }
    };
}

pub(crate) use operation_identity;
pub(crate) use variable_support;
