//! Deserialization coverage for retail prices API payloads.

use azure_pricing_lib::{PriceResponsePage, RetailPrice};

const SAMPLE_PAGE: &str = r#"{
  "BillingCurrency": "USD",
  "CustomerEntityId": "Default",
  "CustomerEntityType": "Retail",
  "Items": [
    {
      "currencyCode": "USD",
      "tierMinimumUnits": 0.0,
      "retailPrice": 0.681,
      "unitPrice": 0.681,
      "armRegionName": "brazilsouth",
      "location": "BR South",
      "effectiveStartDate": "2023-04-01T00:00:00Z",
      "meterId": "f8b94593-9564-5c90-a03b-b50d0b9b2af0",
      "meterName": "F16s v2",
      "productId": "DZH318Z0CSPF",
      "skuId": "DZH318Z0CSPF/006K",
      "productName": "Virtual Machines FSv2 Series",
      "skuName": "F16s v2",
      "serviceName": "Virtual Machines",
      "serviceId": "DZH313Z7MMC8",
      "serviceFamily": "Compute",
      "unitOfMeasure": "1 Hour",
      "type": "Consumption",
      "isPrimaryMeterRegion": true,
      "armSkuName": "Standard_F16s_v2",
      "savingsPlan": [
        { "unitPrice": 0.4455, "retailPrice": 0.4455, "term": "3 Years" },
        { "unitPrice": 0.5585, "retailPrice": 0.5585, "term": "1 Year" }
      ]
    },
    {
      "currencyCode": "USD",
      "retailPrice": 1.362,
      "unitPrice": 1.362,
      "armRegionName": "brazilsouth",
      "location": "BR South",
      "meterName": "F32s v2",
      "productName": "Virtual Machines FSv2 Series",
      "skuName": "F32s v2",
      "serviceName": "Virtual Machines",
      "unitOfMeasure": "1 Hour",
      "type": "Consumption",
      "reservationTerm": "1 Year"
    }
  ],
  "NextPageLink": "https://prices.azure.com:443/api/retail/prices?$skip=100",
  "Count": 2
}"#;

#[test]
fn test_page_deserialization() {
    let page: PriceResponsePage = serde_json::from_str(SAMPLE_PAGE).unwrap();

    assert_eq!(page.billing_currency.as_deref(), Some("USD"));
    assert_eq!(page.count, 2);
    assert_eq!(page.items.len(), 2);
    assert!(page
        .next_page_link
        .as_deref()
        .unwrap()
        .contains("$skip=100"));
}

#[test]
fn test_full_item_fields() {
    let page: PriceResponsePage = serde_json::from_str(SAMPLE_PAGE).unwrap();
    let item = &page.items[0];

    assert_eq!(item.service_name, "Virtual Machines");
    assert_eq!(item.sku_name, "F16s v2");
    assert_eq!(item.arm_sku_name, "Standard_F16s_v2");
    assert_eq!(item.arm_region_name, "brazilsouth");
    assert_eq!(item.location, "BR South");
    assert_eq!(item.retail_price, 0.681);
    assert_eq!(item.unit_of_measure, "1 Hour");
    assert_eq!(item.price_type, "Consumption");
    assert_eq!(item.is_primary_meter_region, Some(true));
    assert!(item.effective_start_date.is_some());

    assert_eq!(item.savings_plan.len(), 2);
    assert_eq!(item.savings_plan[0].term, "3 Years");
    assert_eq!(item.savings_plan[0].retail_price, 0.4455);
}

#[test]
fn test_sparse_item_uses_defaults() {
    let page: PriceResponsePage = serde_json::from_str(SAMPLE_PAGE).unwrap();
    let item = &page.items[1];

    assert_eq!(item.meter_id, "");
    assert_eq!(item.service_family, "");
    assert_eq!(item.arm_sku_name, "");
    assert!(item.savings_plan.is_empty());
    assert!(item.effective_start_date.is_none());
    assert_eq!(item.reservation_term.as_deref(), Some("1 Year"));
    assert_eq!(item.is_primary_meter_region, None);
}

#[test]
fn test_final_page_has_no_continuation() {
    let json = r#"{"BillingCurrency":"EUR","Items":[],"NextPageLink":null,"Count":0}"#;
    let page: PriceResponsePage = serde_json::from_str(json).unwrap();

    assert_eq!(page.billing_currency.as_deref(), Some("EUR"));
    assert!(page.items.is_empty());
    assert!(page.next_page_link.is_none());
}

#[test]
fn test_item_round_trips_through_serde() {
    let page: PriceResponsePage = serde_json::from_str(SAMPLE_PAGE).unwrap();
    let serialized = serde_json::to_string(&page.items[0]).unwrap();
    let reparsed: RetailPrice = serde_json::from_str(&serialized).unwrap();

    assert_eq!(reparsed, page.items[0]);
}
