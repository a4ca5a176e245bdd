/// Builds an array of [ComponentTypes](crate::components::ComponentType) from a list of component types.
#[macro_export]
macro_rules! component_types {
    ($($t: ty),* $(,)?) => {
		[
			$($crate::components::ComponentType::of::<$t>()),*
		]
	};
}
