macro_rules! pinout {
    ($p:ident . can) => ($p.CAN1);
    ($p:ident . can_rx) => ($p.PA11);
    ($p:ident . can_tx) => ($p.PA12);

    ($p:ident . diag_usart) => ($p.USART2);
    ($p:ident . diag_tx) => ($p.PA2);

    ($p:ident . start_btn) => ($p.PC13); // active low, external pull-up
    ($p:ident . start_btn_exti) => ($p.EXTI13);
    ($p:ident . light_lost) => ($p.PC4); // photoresistor, rises when dark
    ($p:ident . light_lost_exti) => ($p.EXTI4);
    ($p:ident . peer_wake) => ($p.PC5); // wired to the referee's PA0
}
