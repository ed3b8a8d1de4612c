use crate::shared::error::CollectionError;

/// OS-native unwrapping of data bound to the current user (DPAPI on Windows).
pub trait DataProtection {
    fn unprotect(&self, blob: &[u8]) -> Result<Vec<u8>, CollectionError>;
}

#[cfg(windows)]
pub struct DpapiProtection;

#[cfg(windows)]
impl DataProtection for DpapiProtection {
    fn unprotect(&self, blob: &[u8]) -> Result<Vec<u8>, CollectionError> {
        use windows::Win32::Security::Cryptography::{CryptUnprotectData, CRYPT_INTEGER_BLOB};
        use windows::Win32::Foundation::*;
        use windows::Win32::System::Memory::*;

        let mut input = blob.to_vec();
        let data_in = CRYPT_INTEGER_BLOB {
            cbData: input.len() as u32,
            pbData: input.as_mut_ptr(),
        };
        let mut data_out = CRYPT_INTEGER_BLOB::default();

        unsafe {
            if !CryptUnprotectData(&data_in, None, None, None, None, 0, &mut data_out).as_bool() {
                return Err(CollectionError::Decryption(format!(
                    "CryptUnprotectData failed: {}",
                    windows::core::Error::from_win32()
                )));
            }

            let plaintext =
                std::slice::from_raw_parts(data_out.pbData, data_out.cbData as usize).to_vec();
            let _ = LocalFree(HLOCAL(data_out.pbData as isize));
            Ok(plaintext)
        }
    }
}

/// Stand-in used on targets without DPAPI; every call fails.
#[cfg(not(windows))]
pub struct DpapiProtection;

#[cfg(not(windows))]
impl DataProtection for DpapiProtection {
    fn unprotect(&self, _blob: &[u8]) -> Result<Vec<u8>, CollectionError> {
        Err(CollectionError::UnsupportedPlatform("DPAPI unprotection"))
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn non_windows_protection_is_unsupported() {
        assert!(matches!(
            DpapiProtection.unprotect(b"blob"),
            Err(CollectionError::UnsupportedPlatform(_))
        ));
    }
}
