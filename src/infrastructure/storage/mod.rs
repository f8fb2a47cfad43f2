//! Sample storage adapters

mod supabase;

pub use supabase::SupabaseStore;
