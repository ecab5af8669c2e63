use serde::Deserialize;

use miqat_core::{GatewayError, Verse};

#[derive(Deserialize, Debug)]
pub struct AyahResponse {
    pub code: u16,
    pub data: AyahData,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AyahData {
    pub text: String,
    pub number_in_surah: u16,
    pub surah: SurahData,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SurahData {
    pub number: u16,
    pub english_name: String,
}

impl AyahResponse {
    pub fn into_verse(self) -> Result<Verse, GatewayError> {
        if self.code != 200 {
            return Err(GatewayError::Status { status: self.code });
        }

        Ok(Verse {
            text: self.data.text,
            surah_name: self.data.surah.english_name,
            surah_number: self.data.surah.number,
            ayah_number: self.data.number_in_surah,
        })
    }
}
