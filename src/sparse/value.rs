//! Key and value families accepted by the sparse structures.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

mod private {
    pub trait Sealed {}
}

/// Unsigned integer keys of up to 64 bits.
pub trait Key: private::Sealed + Copy + Ord + Hash + fmt::Debug + 'static {}

macro_rules! unsigned_key {
    ($($ty:ty),*) => {$(
        impl private::Sealed for $ty {}
        impl Key for $ty {}
    )*};
}

unsigned_key!(u8, u16, u32, u64);

/// A payload that can be stored in a value column.
///
/// Each value type picks the representation it is stored as (`Slot`) and a
/// reserved [`VACANT`](Value::VACANT) slot that marks a deleted entry without
/// shifting the columns. Fixed-width integers reserve an in-band sentinel:
/// `-1` for signed widths and `MAX` for unsigned widths, so those values
/// cannot be stored. Heap payloads are stored as `Option` and use `None`.
pub trait Value: Sized {
    /// In-column representation.
    type Slot;

    /// Tombstone marker.
    const VACANT: Self::Slot;

    /// Wrap a live value for storage.
    fn occupy(self) -> Self::Slot;

    /// Borrow the live value in `slot`, if any.
    fn view(slot: &Self::Slot) -> Option<&Self>;

    /// Unwrap the live value in `slot`, if any.
    fn take(slot: Self::Slot) -> Option<Self>;
}

macro_rules! sentinel_value {
    ($($ty:ty => $sentinel:expr),* $(,)?) => {$(
        impl Value for $ty {
            type Slot = $ty;
            const VACANT: $ty = $sentinel;

            #[inline]
            fn occupy(self) -> $ty {
                self
            }

            #[inline]
            fn view(slot: &$ty) -> Option<&$ty> {
                (*slot != $sentinel).then_some(slot)
            }

            #[inline]
            fn take(slot: $ty) -> Option<$ty> {
                (slot != $sentinel).then_some(slot)
            }
        }
    )*};
}

sentinel_value! {
    i8 => -1,
    i16 => -1,
    i32 => -1,
    i64 => -1,
    isize => -1,
    u8 => u8::MAX,
    u16 => u16::MAX,
    u32 => u32::MAX,
    u64 => u64::MAX,
    usize => usize::MAX,
}

macro_rules! optional_value {
    ($(impl<$($param:ident),*> for $ty:ty;)*) => {$(
        impl<$($param: ?Sized),*> Value for $ty {
            type Slot = Option<$ty>;
            const VACANT: Option<$ty> = None;

            #[inline]
            fn occupy(self) -> Option<$ty> {
                Some(self)
            }

            #[inline]
            fn view(slot: &Option<$ty>) -> Option<&$ty> {
                slot.as_ref()
            }

            #[inline]
            fn take(slot: Option<$ty>) -> Option<$ty> {
                slot
            }
        }
    )*};
}

optional_value! {
    impl<T> for Box<T>;
    impl<T> for Arc<T>;
    impl<> for String;
}

impl<T> Value for Vec<T> {
    type Slot = Option<Vec<T>>;
    const VACANT: Option<Vec<T>> = None;

    #[inline]
    fn occupy(self) -> Option<Vec<T>> {
        Some(self)
    }

    #[inline]
    fn view(slot: &Option<Vec<T>>) -> Option<&Vec<T>> {
        slot.as_ref()
    }

    #[inline]
    fn take(slot: Option<Vec<T>>) -> Option<Vec<T>> {
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_sentinels() {
        assert_eq!(<i32 as Value>::VACANT, -1);
        assert_eq!(<i64 as Value>::VACANT, -1);
        assert_eq!(<u16 as Value>::VACANT, 65535);
        assert_eq!(<u32 as Value>::VACANT, u32::MAX);

        assert_eq!(i32::view(&7), Some(&7));
        assert_eq!(i32::view(&-1), None);
        assert_eq!(u16::take(65535), None);
        assert_eq!(u16::take(0), Some(0));
    }

    #[test]
    fn test_heap_values_use_absence() {
        let slot = Box::<str>::from("x").occupy();
        assert_eq!(Box::<str>::view(&slot).map(|s| &**s), Some("x"));
        assert!(Box::<str>::view(&<Box<str> as Value>::VACANT).is_none());

        let slot = String::from("y").occupy();
        assert_eq!(String::take(slot).as_deref(), Some("y"));

        let slot = vec![1u8].occupy();
        assert_eq!(Vec::<u8>::view(&slot), Some(&vec![1u8]));
    }
}
