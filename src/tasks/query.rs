use crate::components::{Component, ComponentType};
use paste::paste;

/// One element of a [Query]: `&T` reads component `T`, `&mut T` writes it.
pub trait ComponentFetch {
	type Item<'a>;

	/// Whether the fetch hands out mutable access.
	const WRITE: bool;

	fn component_type() -> ComponentType;

	/// # Safety
	/// `column` must be the base of a column of [`component_type`](Self::component_type) with at least
	/// `row + 1` initialized values, and the returned reference must not alias any other live reference.
	unsafe fn fetch<'a>(column: *mut u8, row: usize) -> Self::Item<'a>;
}

impl<T: Component> ComponentFetch for &T {
	type Item<'a> = &'a T;
	const WRITE: bool = false;

	fn component_type() -> ComponentType {
		ComponentType::of::<T>()
	}

	#[inline(always)]
	unsafe fn fetch<'a>(column: *mut u8, row: usize) -> Self::Item<'a> {
		&*(column as *const T).add(row)
	}
}

impl<T: Component> ComponentFetch for &mut T {
	type Item<'a> = &'a mut T;
	const WRITE: bool = true;

	fn component_type() -> ComponentType {
		ComponentType::of::<T>()
	}

	#[inline(always)]
	unsafe fn fetch<'a>(column: *mut u8, row: usize) -> Self::Item<'a> {
		&mut *(column as *mut T).add(row)
	}
}

/// A tuple of [component fetches](ComponentFetch) iterated together,
/// e.g. `(&mut Position, &Velocity)`.
pub trait Query {
	type Item<'a>;

	/// The accessed component types in tuple order, each with whether it is written.
	fn accesses() -> Vec<(ComponentType, bool)>;

	/// # Safety
	/// `columns` holds the column bases of one chunk in [`accesses`](Self::accesses) order,
	/// and `row` is a live row of that chunk.
	unsafe fn fetch<'a>(columns: &[*mut u8], row: usize) -> Self::Item<'a>;
}

macro_rules! impl_query {
    ($($t: ident),*) => {
        paste! {
            impl<$($t: ComponentFetch),*> Query for ($($t,)*) {
                type Item<'a> = ($(<$t as ComponentFetch>::Item<'a>,)*);

                fn accesses() -> Vec<(ComponentType, bool)> {
                    vec![$((<$t as ComponentFetch>::component_type(), <$t as ComponentFetch>::WRITE)),*]
                }

                #[inline(always)]
                #[allow(unused_assignments)]
                unsafe fn fetch<'a>(columns: &[*mut u8], row: usize) -> Self::Item<'a> {
                    let mut column = 0;
                    $(
                        let [<$t:lower>] = <$t as ComponentFetch>::fetch(columns[column], row);
                        column += 1;
                    )*
                    ($([<$t:lower>],)*)
                }
            }
        }
    };
}

impl_query!(T0);
impl_query!(T0, T1);
impl_query!(T0, T1, T2);
impl_query!(T0, T1, T2, T3);
impl_query!(T0, T1, T2, T3, T4);
impl_query!(T0, T1, T2, T3, T4, T5);
impl_query!(T0, T1, T2, T3, T4, T5, T6);
impl_query!(T0, T1, T2, T3, T4, T5, T6, T7);
