/// Defines a thin wrapper around a native handle, borrowing the [`Scene`](crate::Scene) it came
/// from. Wrappers compare equal when their native handles do.
macro_rules! scene_wrapper {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy)]
        pub struct $name<'s> {
            scene: &'s $crate::Scene,
            native: $crate::NativeHandle,
        }

        impl<'s> $name<'s> {
            pub fn new(scene: &'s $crate::Scene, native: $crate::NativeHandle) -> Self {
                Self { scene, native }
            }

            pub fn scene(&self) -> &'s $crate::Scene {
                self.scene
            }

            pub fn native_handle(&self) -> $crate::NativeHandle {
                self.native
            }
        }

        impl PartialEq for $name<'_> {
            fn eq(&self, other: &Self) -> bool {
                self.native == other.native
            }
        }

        impl Eq for $name<'_> {}

        impl ::std::fmt::Debug for $name<'_> {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.native).finish()
            }
        }
    };
}

/// Implements `name` and `unique_id` accessors through the scene's naming hooks.
macro_rules! named_wrapper {
    ($name:ident) => {
        impl $name<'_> {
            pub fn name(&self) -> String {
                self.scene.native_name(self.native)
            }

            pub fn unique_id(&self) -> u64 {
                self.scene.native_unique_id(self.native)
            }
        }
    };
}
