use crate::features::registry::models::{decode_value, filetime_to_datetime, RegistryValue};
use crate::shared::error::CollectionError;
use log::debug;
use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::*;
use windows::Win32::System::Registry::*;

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

pub fn read_first_value(key_path: &str) -> Result<RegistryValue, CollectionError> {
    let subkey = wide(key_path);

    unsafe {
        let mut key = HKEY::default();
        let status = RegOpenKeyExW(
            HKEY_CURRENT_USER,
            PCWSTR(subkey.as_ptr()),
            0,
            KEY_READ,
            &mut key,
        );

        if status == ERROR_FILE_NOT_FOUND || status == ERROR_PATH_NOT_FOUND {
            return Err(CollectionError::PathNotFound(key_path.to_string()));
        }
        if status.is_err() {
            return Err(CollectionError::SystemApi(format!(
                "RegOpenKeyExW({}) failed: {:?}",
                key_path, status
            )));
        }

        let result = read_key(key, key_path);
        let _ = RegCloseKey(key);
        result
    }
}

unsafe fn read_key(key: HKEY, key_path: &str) -> Result<RegistryValue, CollectionError> {
    let mut max_name_len = 0u32;
    let mut max_data_len = 0u32;
    let mut last_write = FILETIME::default();

    let status = RegQueryInfoKeyW(
        key,
        PWSTR::null(),
        None,
        None,
        None,
        None,
        None,
        None,
        Some(&mut max_name_len),
        Some(&mut max_data_len),
        None,
        Some(&mut last_write),
    );
    if status.is_err() {
        return Err(CollectionError::SystemApi(format!(
            "RegQueryInfoKeyW({}) failed: {:?}",
            key_path, status
        )));
    }

    // Lengths exclude the terminating null
    let mut name_buf = vec![0u16; max_name_len as usize + 1];
    let mut data_buf = vec![0u8; max_data_len as usize + 2];
    let mut name_size = name_buf.len() as u32;
    let mut data_size = data_buf.len() as u32;
    let mut value_type = 0u32;

    let status = RegEnumValueW(
        key,
        0,
        PWSTR(name_buf.as_mut_ptr()),
        &mut name_size,
        None,
        Some(&mut value_type),
        Some(data_buf.as_mut_ptr()),
        Some(&mut data_size),
    );

    if status == ERROR_NO_MORE_ITEMS {
        return Err(CollectionError::SystemApi(format!("{} has no values", key_path)));
    }
    if status.is_err() {
        return Err(CollectionError::SystemApi(format!(
            "RegEnumValueW({}) failed: {:?}",
            key_path, status
        )));
    }

    let name = String::from_utf16_lossy(&name_buf[..name_size as usize]);
    debug!("Registry value {} has type {} and {} bytes", name, value_type, data_size);

    Ok(RegistryValue {
        name,
        data: decode_value(value_type, &data_buf[..data_size as usize]),
        value_type,
        last_write_time: filetime_to_datetime(last_write.dwLowDateTime, last_write.dwHighDateTime),
    })
}
