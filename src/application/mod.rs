pub mod basket_service;
