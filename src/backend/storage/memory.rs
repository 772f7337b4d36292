// src/backend/storage/memory.rs
use ic_stable_structures::memory_manager::{MemoryId, MemoryManager, VirtualMemory};
use ic_stable_structures::DefaultMemoryImpl;
use std::cell::RefCell;

// Memory IDs for stable structures. Keep these non-overlapping; once a
// region has shipped its id must never be reused for another structure.
const FAMILIES_MEM_ID: MemoryId = MemoryId::new(0);
const FAMILY_CODES_MEM_ID: MemoryId = MemoryId::new(1);
const METRICS_MEM_ID: MemoryId = MemoryId::new(2);
// IDs 3-19 reserved for future collections.
const ADMIN_PRINCIPAL_MEM_ID: MemoryId = MemoryId::new(20);
const CRON_PRINCIPAL_MEM_ID: MemoryId = MemoryId::new(21);
const MIN_CYCLES_THRESHOLD_MEM_ID: MemoryId = MemoryId::new(22);
const PSP_API_URL_MEM_ID: MemoryId = MemoryId::new(23);
const MAIL_API_URL_MEM_ID: MemoryId = MemoryId::new(24);
const IDEA_API_URL_MEM_ID: MemoryId = MemoryId::new(25);

pub type Memory = VirtualMemory<DefaultMemoryImpl>;

thread_local! {
    static MEMORY_MANAGER: RefCell<MemoryManager<DefaultMemoryImpl>> = RefCell::new(
        MemoryManager::init(DefaultMemoryImpl::default())
    );
}

/// Get memory instance for a specific MemoryId.
fn get_memory(id: MemoryId) -> Memory {
    MEMORY_MANAGER.with(|m| m.borrow().get(id))
}

pub fn get_families_memory() -> Memory {
    get_memory(FAMILIES_MEM_ID)
}

pub fn get_family_codes_memory() -> Memory {
    get_memory(FAMILY_CODES_MEM_ID)
}

pub fn get_metrics_memory() -> Memory {
    get_memory(METRICS_MEM_ID)
}

pub fn get_admin_principal_memory() -> Memory {
    get_memory(ADMIN_PRINCIPAL_MEM_ID)
}

pub fn get_cron_principal_memory() -> Memory {
    get_memory(CRON_PRINCIPAL_MEM_ID)
}

pub fn get_min_cycles_threshold_memory() -> Memory {
    get_memory(MIN_CYCLES_THRESHOLD_MEM_ID)
}

pub fn get_psp_api_url_memory() -> Memory {
    get_memory(PSP_API_URL_MEM_ID)
}

pub fn get_mail_api_url_memory() -> Memory {
    get_memory(MAIL_API_URL_MEM_ID)
}

pub fn get_idea_api_url_memory() -> Memory {
    get_memory(IDEA_API_URL_MEM_ID)
}
