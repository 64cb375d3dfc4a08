//! Bounded numeric argument types.

use crate::args::{ArgValue, ArgumentType};
use crate::diagnostics::CommandError;
use crate::reader::StringReader;

/// Generates one bounded numeric argument type. Each reads a number body
/// with the matching tokenizer, then applies the bounds, rewinding the
/// reader before reporting an out-of-range value.
macro_rules! bounded_numeric {
    (
        $(#[$doc:meta])*
        $name:ident, $prim:ty, $variant:ident, $read:ident,
        $too_low:ident, $too_high:ident, [$($example:literal),*]
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            min: $prim,
            max: $prim,
        }

        impl $name {
            /// Accepts the full range of the underlying type.
            pub fn any() -> Self {
                Self {
                    min: <$prim>::MIN,
                    max: <$prim>::MAX,
                }
            }

            /// Accepts values of at least `min`.
            pub fn at_least(min: $prim) -> Self {
                Self {
                    min,
                    max: <$prim>::MAX,
                }
            }

            /// Accepts values in `[min, max]`.
            pub fn between(min: $prim, max: $prim) -> Self {
                Self { min, max }
            }

            pub fn min(&self) -> $prim {
                self.min
            }

            pub fn max(&self) -> $prim {
                self.max
            }
        }

        #[async_trait::async_trait]
        impl<S: Send + Sync> ArgumentType<S> for $name {
            fn parse(&self, reader: &mut StringReader) -> Result<ArgValue, CommandError> {
                let start = reader.cursor();
                let result = reader.$read()?;
                if result < self.min {
                    reader.set_cursor(start);
                    return Err(CommandError::$too_low(reader, result, self.min));
                }
                if result > self.max {
                    reader.set_cursor(start);
                    return Err(CommandError::$too_high(reader, result, self.max));
                }
                Ok(ArgValue::$variant(result))
            }

            fn examples(&self) -> Vec<String> {
                vec![$($example.to_string()),*]
            }
        }
    };
}

bounded_numeric!(
    /// A bounded `i32` argument.
    IntegerArgumentType, i32, Integer, read_int,
    integer_too_low, integer_too_high, ["0", "123", "-123"]
);

bounded_numeric!(
    /// A bounded `i64` argument.
    LongArgumentType, i64, Long, read_long,
    long_too_low, long_too_high, ["0", "123", "-123"]
);

bounded_numeric!(
    /// A bounded `f32` argument.
    FloatArgumentType, f32, Float, read_float,
    float_too_low, float_too_high, ["0", "1.2", ".5", "-1", "-.5", "-1234.56"]
);

bounded_numeric!(
    /// A bounded `f64` argument.
    DoubleArgumentType, f64, Double, read_double,
    double_too_low, double_too_high, ["0", "1.2", ".5", "-1", "-.5", "-1234.56"]
);
