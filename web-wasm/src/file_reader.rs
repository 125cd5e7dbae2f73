//! ブラウザのFileをUploadedImageとして読み込む

use futures::channel::oneshot;
use medreport_common::{Error, UploadedImage};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{File, FileReader, ProgressEvent};

/// ファイルを読み込む
///
/// 中身の検証はせず、MIMEタイプが空なら拡張子から推定する。
/// 読み込みに失敗した場合は `Error::Encoding`。
pub async fn read_file(file: File) -> Result<UploadedImage, Error> {
    let reader = FileReader::new().map_err(encoding_error)?;
    let (tx, rx) = oneshot::channel::<Result<(), String>>();
    let tx = Rc::new(RefCell::new(Some(tx)));

    let onload = {
        let tx = tx.clone();
        Closure::once(move |_: ProgressEvent| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Ok(()));
            }
        })
    };

    let onerror = {
        let tx = tx.clone();
        let reader = reader.clone();
        Closure::once(move |_: ProgressEvent| {
            let message = reader
                .error()
                .map(|e| e.message())
                .unwrap_or_else(|| "Failed to read the selected file.".to_string());
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(Err(message));
            }
        })
    };

    reader.set_onload(Some(onload.as_ref().unchecked_ref()));
    reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    reader.read_as_array_buffer(&file).map_err(encoding_error)?;

    let outcome = rx
        .await
        .unwrap_or_else(|_| Err("File reading was cancelled.".to_string()));

    reader.set_onload(None);
    reader.set_onerror(None);
    drop(onload);
    drop(onerror);

    outcome.map_err(Error::Encoding)?;

    let buffer = reader.result().map_err(encoding_error)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    Ok(UploadedImage::new(bytes, &file.type_(), &file.name()))
}

fn encoding_error(value: JsValue) -> Error {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "Failed to read the selected file.".to_string());
    Error::Encoding(message)
}
