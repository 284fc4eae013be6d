use serde_json::Value;

use crate::models::{ShopProductDetail, ShopProductSummary, YnFlag};
use crate::normalize::probe::{unwrap_record, Record};

const PRODUCT_ID: &[&str] = &["productId", "PRODUCT_ID", "prdId", "PRD_ID", "id", "ID"];
const PRODUCT_NM: &[&str] = &["productNm", "PRODUCT_NM", "prdNm", "PRD_NM", "name", "NAME"];
const PRICE: &[&str] = &["price", "PRICE", "listPrice", "LIST_PRICE"];
const SALE_PRICE: &[&str] = &["salePrice", "SALE_PRICE", "discountPrice", "DISCOUNT_PRICE"];
const THUMBNAIL: &[&str] = &["thumbnailUrl", "THUMBNAIL_URL", "thumbUrl", "THUMB_URL", "imageUrl", "IMAGE_URL"];
const CATEGORY: &[&str] = &["categoryNm", "CATEGORY_NM", "category", "CATEGORY"];
const SOLD_OUT_YN: &[&str] = &["soldOutYn", "SOLD_OUT_YN"];
const DESCRIPTION: &[&str] = &["description", "DESCRIPTION", "productDesc", "PRODUCT_DESC"];
const STOCK_QTY: &[&str] = &["stockQty", "STOCK_QTY", "stock", "STOCK"];
const IMAGE_URLS: &[&str] = &["imageUrls", "IMAGE_URLS", "images", "IMAGES"];

pub fn adapt_in_product_summary(raw: &Value) -> ShopProductSummary {
    summary_from(unwrap_record(raw))
}

pub fn adapt_in_product_detail(raw: &Value) -> ShopProductDetail {
    let r = unwrap_record(raw);
    ShopProductDetail {
        summary: summary_from(r),
        description: r.string(DESCRIPTION),
        stock_qty: r.int(STOCK_QTY),
        image_urls: r.string_list(IMAGE_URLS).unwrap_or_default(),
    }
}

fn summary_from(r: Record<'_>) -> ShopProductSummary {
    ShopProductSummary {
        product_id: r.int(PRODUCT_ID),
        product_nm: r.string(PRODUCT_NM),
        price: r.number(PRICE),
        sale_price: r.number(SALE_PRICE),
        thumbnail_url: r.string(THUMBNAIL),
        category_nm: r.string(CATEGORY),
        sold_out_yn: r.flag(SOLD_OUT_YN).map(YnFlag::from).unwrap_or_default(),
    }
}
